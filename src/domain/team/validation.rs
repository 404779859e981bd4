//! Team validation

use thiserror::Error;

use super::entity::TeamMember;

/// Errors that can occur during team validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TeamValidationError {
    #[error("Team ID cannot be empty")]
    EmptyId,

    #[error("Team ID cannot exceed {0} characters")]
    IdTooLong(usize),

    #[error("Team ID cannot contain whitespace or control characters")]
    InvalidIdCharacters,

    #[error("Team name cannot be empty")]
    EmptyName,

    #[error("Team name cannot exceed {0} characters")]
    NameTooLong(usize),

    #[error("Team leader cannot be empty")]
    EmptyLeader,

    #[error("Team leader cannot exceed {0} characters")]
    LeaderTooLong(usize),

    #[error("Member #{0} has an empty name")]
    EmptyMemberName(usize),

    #[error("Member #{0} has an empty college name")]
    EmptyCollegeName(usize),
}

const MAX_TEAM_ID_LENGTH: usize = 50;
const MAX_TEAM_NAME_LENGTH: usize = 100;
const MAX_LEADER_LENGTH: usize = 100;

/// Validate a team ID
pub fn validate_team_id(id: &str) -> Result<(), TeamValidationError> {
    if id.is_empty() {
        return Err(TeamValidationError::EmptyId);
    }

    if id.len() > MAX_TEAM_ID_LENGTH {
        return Err(TeamValidationError::IdTooLong(MAX_TEAM_ID_LENGTH));
    }

    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(TeamValidationError::InvalidIdCharacters);
    }

    Ok(())
}

/// Validate a team name
pub fn validate_team_name(name: &str) -> Result<(), TeamValidationError> {
    if name.trim().is_empty() {
        return Err(TeamValidationError::EmptyName);
    }

    if name.len() > MAX_TEAM_NAME_LENGTH {
        return Err(TeamValidationError::NameTooLong(MAX_TEAM_NAME_LENGTH));
    }

    Ok(())
}

/// Validate a team leader
pub fn validate_leader(leader: &str) -> Result<(), TeamValidationError> {
    if leader.trim().is_empty() {
        return Err(TeamValidationError::EmptyLeader);
    }

    if leader.len() > MAX_LEADER_LENGTH {
        return Err(TeamValidationError::LeaderTooLong(MAX_LEADER_LENGTH));
    }

    Ok(())
}

/// Validate team members; positions in errors are 1-based
pub fn validate_members(members: &[TeamMember]) -> Result<(), TeamValidationError> {
    for (index, member) in members.iter().enumerate() {
        if member.name.trim().is_empty() {
            return Err(TeamValidationError::EmptyMemberName(index + 1));
        }

        if member.college_name.trim().is_empty() {
            return Err(TeamValidationError::EmptyCollegeName(index + 1));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_team_id() {
        assert!(validate_team_id("2501").is_ok());
        assert!(validate_team_id("legacy-team").is_ok());
    }

    #[test]
    fn test_empty_team_id() {
        assert_eq!(validate_team_id(""), Err(TeamValidationError::EmptyId));
    }

    #[test]
    fn test_team_id_too_long() {
        let long_id = "1".repeat(51);
        assert_eq!(
            validate_team_id(&long_id),
            Err(TeamValidationError::IdTooLong(50))
        );
    }

    #[test]
    fn test_team_id_whitespace() {
        assert_eq!(
            validate_team_id("25 01"),
            Err(TeamValidationError::InvalidIdCharacters)
        );
    }

    #[test]
    fn test_blank_name_and_leader() {
        assert_eq!(validate_team_name("   "), Err(TeamValidationError::EmptyName));
        assert_eq!(validate_leader(""), Err(TeamValidationError::EmptyLeader));
        assert!(validate_team_name("Alpha").is_ok());
        assert!(validate_leader("Amy").is_ok());
    }

    #[test]
    fn test_name_too_long() {
        let long_name = "a".repeat(101);
        assert_eq!(
            validate_team_name(&long_name),
            Err(TeamValidationError::NameTooLong(100))
        );
    }

    #[test]
    fn test_members() {
        let good = vec![TeamMember::new("Bob", "X"), TeamMember::new("Cy", "Y")];
        assert!(validate_members(&good).is_ok());

        let no_name = vec![TeamMember::new("Bob", "X"), TeamMember::new(" ", "Y")];
        assert_eq!(
            validate_members(&no_name),
            Err(TeamValidationError::EmptyMemberName(2))
        );

        let no_college = vec![TeamMember::new("Bob", "")];
        assert_eq!(
            validate_members(&no_college),
            Err(TeamValidationError::EmptyCollegeName(1))
        );
    }
}
