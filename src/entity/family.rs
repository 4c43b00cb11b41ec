//! Family ties. Owned by the population subsystem; behavior only reads them
//! and severs references that no longer resolve.

use serde::{Deserialize, Serialize};

use crate::city::building::BuildingId;
use crate::core::types::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RelationshipStatus {
    #[default]
    Single,
    Partnered,
    Married,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Family {
    pub status: RelationshipStatus,
    pub partner: Option<EntityId>,
    pub children: Vec<EntityId>,
    pub home: Option<BuildingId>,
    pub pregnant: bool,
    pub pregnancy_progress: f32,
}

impl Family {
    pub fn has_partner(&self) -> bool {
        self.partner.is_some()
    }

    /// Forget the partner; status falls back to single
    pub fn sever_partner(&mut self) {
        self.partner = None;
        self.status = RelationshipStatus::Single;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sever_partner_resets_status() {
        let mut family = Family {
            status: RelationshipStatus::Married,
            partner: Some(EntityId(4)),
            ..Family::default()
        };
        assert!(family.has_partner());
        family.sever_partner();
        assert_eq!(family.status, RelationshipStatus::Single);
        assert!(!family.has_partner());
    }
}
