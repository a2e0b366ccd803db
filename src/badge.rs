/// Label drawn on a navigation badge. `None` means no badge element at all,
/// counts above 99 collapse to "99+".
pub fn badge_label(count: u64) -> Option<String> {
    if count == 0 {
        return None;
    }

    if count > 99 {
        Some("99+".to_string())
    } else {
        Some(count.to_string())
    }
}
