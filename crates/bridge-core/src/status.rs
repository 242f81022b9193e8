/// Map a change-execution issue status to the intake transition it drives.
///
/// This is a closed mapping: statuses outside it (CANCELED, paused rollout
/// states, anything added upstream later) are skipped, not errored, so the
/// poller stays quiet for issues the intake side has no transition for.
pub fn intake_transition(execution_status: &str) -> Option<&'static str> {
    match execution_status {
        "DONE" => Some("Done"),
        "OPEN" => Some("In Progress"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn done_maps_to_done() {
        assert_eq!(intake_transition("DONE"), Some("Done"));
    }

    #[test]
    fn open_maps_to_in_progress() {
        assert_eq!(intake_transition("OPEN"), Some("In Progress"));
    }

    #[test]
    fn other_statuses_are_skipped() {
        assert_eq!(intake_transition("CANCELED"), None);
        assert_eq!(intake_transition(""), None);
        assert_eq!(intake_transition("done"), None);
    }
}
