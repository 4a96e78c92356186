use chrono::{DateTime, Utc};

/// Build-mode switches consulted by [`should_build`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildFlags {
    pub build_future: bool,
    pub build_expired: bool,
    pub build_drafts: bool,
}

/// Publication state of a single page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishState {
    pub draft: bool,
    pub publish_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Whether a page takes part in output right now
pub fn should_build(flags: BuildFlags, state: PublishState) -> bool {
    should_build_at(flags, state, Utc::now())
}

/// Whether a page takes part in output at `now`.
///
/// Drafts are skipped unless drafts are built, pages published after `now`
/// unless future pages are built, and pages expired before `now` unless
/// expired pages are built. Unset dates never exclude a page.
pub fn should_build_at(flags: BuildFlags, state: PublishState, now: DateTime<Utc>) -> bool {
    if state.draft && !flags.build_drafts {
        return false;
    }
    if !flags.build_future && state.publish_date.is_some_and(|date| date > now) {
        return false;
    }
    if !flags.build_expired && state.expiry_date.is_some_and(|date| date < now) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_plain_page_is_built() {
        assert!(should_build_at(BuildFlags::default(), PublishState::default(), now()));
    }

    #[test]
    fn test_drafts_need_build_drafts() {
        let state = PublishState { draft: true, ..Default::default() };
        let everything_but_drafts = BuildFlags { build_future: true, build_expired: true, build_drafts: false };
        assert!(!should_build_at(everything_but_drafts, state, now()));

        let with_drafts = BuildFlags { build_drafts: true, ..Default::default() };
        assert!(should_build_at(with_drafts, state, now()));
    }

    #[test]
    fn test_future_pages_need_build_future() {
        let state = PublishState {
            publish_date: Some(now() + Duration::seconds(1)),
            ..Default::default()
        };
        assert!(!should_build_at(BuildFlags::default(), state, now()));

        let flags = BuildFlags { build_future: true, ..Default::default() };
        assert!(should_build_at(flags, state, now()));
    }

    #[test]
    fn test_expired_pages_need_build_expired() {
        let state = PublishState {
            expiry_date: Some(now() - Duration::days(1)),
            ..Default::default()
        };
        assert!(!should_build_at(BuildFlags::default(), state, now()));

        let flags = BuildFlags { build_expired: true, ..Default::default() };
        assert!(should_build_at(flags, state, now()));
    }

    #[test]
    fn test_publish_date_equal_to_now_is_built() {
        let state = PublishState { publish_date: Some(now()), ..Default::default() };
        assert!(should_build_at(BuildFlags::default(), state, now()));
    }
}
