//! Inventory request types

use serde::{Deserialize, Serialize};

/// Request to add a weapon serial to weapon stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AddWeaponRequest {
    /// Weapon type, i.e. the stock column header
    pub weapon_name: String,
    pub serial_number: String,
}

/// Request to add an intention (optic) serial to intention stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AddIntentionRequest {
    pub intention_type: String,
    pub serial_number: String,
}

/// Request to enroll a person in a group with a weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AssignWeaponRequest {
    pub full_name: String,
    pub group: String,
    /// Weapon serial
    pub serial_number: String,
    /// Weapon type
    pub item_name: String,
    /// Counted intention type issued with the weapon; blank for none
    #[serde(default)]
    pub intention_type: Option<String>,
}

/// Request naming one person's intention serial; used to assign and return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct IntentionAssignmentRequest {
    pub full_name: String,
    pub group: String,
    pub intention_type: String,
    pub serial_number: String,
}

/// Request to return everything a person holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReturnAllRequest {
    pub full_name: String,
    pub group: String,
}

/// Request to move a serial between stock and the repair worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RepairItemRequest {
    /// Weapon stock when true, intention stock otherwise
    pub is_weapon: bool,
    pub item_type: String,
    pub serial_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_weapon_intention_is_optional() {
        let req: AssignWeaponRequest = serde_json::from_str(
            r#"{"full_name":"Dana","group":"א","serial_number":"W1","item_name":"M4"}"#,
        )
        .unwrap();
        assert_eq!(req.intention_type, None);
    }

    #[test]
    fn test_repair_request_field_names() {
        let req: RepairItemRequest = serde_json::from_str(
            r#"{"is_weapon":false,"item_type":"ACOG","serial_number":"A1"}"#,
        )
        .unwrap();
        assert!(!req.is_weapon);
        assert_eq!(req.item_type, "ACOG");
    }
}
