//! Team domain model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub division_id: Option<i64>,
}

impl Team {
    /// Key used for this team in a reminder report, e.g. `Owls-3`.
    pub fn report_key(&self) -> String {
        format!("{}-{}", self.name, self.division_id.unwrap_or(0))
    }

    /// `report_key` with the team id appended, e.g. `Owls-3-12`. Used when two
    /// teams in one report share a name and division.
    pub fn unique_report_key(&self) -> String {
        format!("{}-{}", self.report_key(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_key() {
        let team = Team {
            id: 1,
            name: "Owls".to_string(),
            division_id: Some(3),
        };
        assert_eq!(team.report_key(), "Owls-3");

        let team = Team {
            division_id: None,
            ..team
        };
        assert_eq!(team.report_key(), "Owls-0");
        assert_eq!(team.unique_report_key(), "Owls-0-1");
    }
}
