use serde::Deserialize;

use crate::counter::CounterKey;

/// "ابحث عن وظيفة" — the poster is seeking a job, so the post is broadcast
/// *to* employers.
pub const SEEKING_JOB_MARKER: &str = "ابحث عن وظيفة";

/// "ابحث عن موظفين" — the poster is seeking employees, broadcast to seekers.
pub const SEEKING_STAFF_MARKER: &str = "ابحث عن موظفين";

/// Inbound push payload as the transport shim delivers it. Every field is
/// optional, push producers are not trusted to fill any of them.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PushPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "displayPage")]
    pub display_page: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "postTitle")]
    pub post_title: Option<String>,
    #[serde(rename = "postId")]
    pub post_id: Option<String>,
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

/// Maps a push payload to the badge buckets it should bump. Pure: applying
/// the deltas is the caller's job, see [`CounterStore::apply`].
///
/// First match wins between the jobs and haraj branches. A payload matching
/// neither classifies to an empty list, which is not an error — plenty of
/// pushes (videos, system notices) carry no badge at all.
///
/// [`CounterStore::apply`]: crate::counter::CounterStore::apply
pub fn classify(payload: &PushPayload) -> Vec<(CounterKey, i64)> {
    let kind = payload
        .kind
        .as_deref()
        .or(payload.display_page.as_deref())
        .unwrap_or("");
    let category = payload.category.as_deref().unwrap_or("");
    let title = payload.post_title.as_deref().unwrap_or("");

    let jobs_marker = title.contains(SEEKING_JOB_MARKER) || title.contains(SEEKING_STAFF_MARKER);

    if kind == "jobs" || category.starts_with("jobs_") || jobs_marker {
        if title.contains(SEEKING_JOB_MARKER) {
            vec![(CounterKey::JobsEmployer, 1), (CounterKey::JobsTotal, 1)]
        } else if title.contains(SEEKING_STAFF_MARKER) {
            vec![(CounterKey::JobsSeeker, 1), (CounterKey::JobsTotal, 1)]
        } else {
            // Generic jobs signal, no sub-bucket known.
            vec![(CounterKey::JobsTotal, 1)]
        }
    } else if kind == "haraj" || category.starts_with("haraj_") {
        let mut deltas = vec![(CounterKey::HarajTotal, 1)];
        if !category.is_empty() {
            deltas.push((CounterKey::haraj_category(category), 1));
        }
        deltas
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn payload(kind: Option<&str>, category: Option<&str>, title: Option<&str>) -> PushPayload {
        PushPayload {
            kind: kind.map(str::to_string),
            category: category.map(str::to_string),
            post_title: title.map(str::to_string),
            ..PushPayload::default()
        }
    }

    #[test]
    fn seeking_job_title_bumps_employer_side() {
        let deltas = classify(&payload(None, None, Some("ابحث عن وظيفة في بغداد")));
        assert_eq!(
            deltas,
            vec![(CounterKey::JobsEmployer, 1), (CounterKey::JobsTotal, 1)]
        );
    }

    #[test]
    fn seeking_staff_title_bumps_seeker_side() {
        let deltas = classify(&payload(None, None, Some("ابحث عن موظفين للمطعم")));
        assert_eq!(
            deltas,
            vec![(CounterKey::JobsSeeker, 1), (CounterKey::JobsTotal, 1)]
        );
    }

    #[test]
    fn jobs_type_without_marker_bumps_total_only() {
        let deltas = classify(&payload(Some("jobs"), None, Some("سائق خاص")));
        assert_eq!(deltas, vec![(CounterKey::JobsTotal, 1)]);
    }

    #[test]
    fn jobs_category_prefix_selects_jobs_branch() {
        let deltas = classify(&payload(None, Some("jobs_drivers"), None));
        assert_eq!(deltas, vec![(CounterKey::JobsTotal, 1)]);
    }

    #[test]
    fn haraj_with_category_bumps_total_and_category() {
        let deltas = classify(&payload(Some("haraj"), Some("cars"), None));
        assert_eq!(
            deltas,
            vec![
                (CounterKey::HarajTotal, 1),
                (CounterKey::haraj_category("cars"), 1),
            ]
        );
    }

    #[test]
    fn haraj_without_category_bumps_total_only() {
        let deltas = classify(&payload(Some("haraj"), None, None));
        assert_eq!(deltas, vec![(CounterKey::HarajTotal, 1)]);
    }

    #[test]
    fn display_page_stands_in_for_missing_type() {
        let mut payload = payload(None, Some("cars"), None);
        payload.display_page = Some("haraj".to_string());

        let deltas = classify(&payload);
        assert_eq!(
            deltas,
            vec![
                (CounterKey::HarajTotal, 1),
                (CounterKey::haraj_category("cars"), 1),
            ]
        );
    }

    #[test]
    fn unrecognized_payload_classifies_to_nothing() {
        assert!(classify(&payload(Some("other"), None, None)).is_empty());
        assert!(classify(&PushPayload::default()).is_empty());
    }

    #[test]
    fn jobs_branch_wins_over_haraj_category() {
        // A jobs type with a haraj-looking category still lands in jobs.
        let deltas = classify(&payload(Some("jobs"), Some("haraj_cars"), None));
        assert_eq!(deltas, vec![(CounterKey::JobsTotal, 1)]);
    }

    #[test]
    fn camel_case_wire_fields_deserialize() {
        let payload: PushPayload = serde_json::from_str(
            r#"{"type":"haraj","displayPage":"haraj","category":"cars","postTitle":"سيارة للبيع","postId":"88"}"#,
        )
        .unwrap();

        assert_eq!(payload.kind.as_deref(), Some("haraj"));
        assert_eq!(payload.post_id.as_deref(), Some("88"));
        assert!(payload.video_id.is_none());
    }
}
