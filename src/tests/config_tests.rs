use super::init_logging;
use crate::config::participant_policy;
use crate::core::balance::UnknownParticipantPolicy;

#[test]
fn test_participant_policy_parsing() {
    init_logging();
    assert_eq!(participant_policy(None), UnknownParticipantPolicy::Reject);
    assert_eq!(participant_policy(Some("Skip")), UnknownParticipantPolicy::Skip);
    assert_eq!(participant_policy(Some("reject")), UnknownParticipantPolicy::Reject);
}

#[test]
fn test_invalid_participant_policy_falls_back_to_default() {
    init_logging();
    assert_eq!(participant_policy(Some("drop-them")), UnknownParticipantPolicy::default());
}
