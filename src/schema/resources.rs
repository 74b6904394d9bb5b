//! Field declarations for every resource and the single resource -> schema dispatch.

use super::enums::*;
use super::{validate, Mode, Presence, Rule};
use crate::error::AppError;
use crate::registry::Resource;
use serde_json::{json, Map, Value};

/// Users log in with exactly four digits.
pub const PIN_PATTERN: &str = r"^[0-9]{4}$";

const ID: usize = 64;
const NAME: usize = 256;
const TEXT: usize = 4000;

resource_schema! {
    UserFields {
        id: String = Presence::Key, Rule::Length(0, ID);
        name: String = Presence::Required, Rule::Length(1, NAME);
        role: Role = Presence::Required;
        pin: String = Presence::Required, Rule::Pattern(PIN_PATTERN);
        avatar: String = Presence::Optional, Rule::Length(0, 512);
    }
}

resource_schema! {
    MachineFields {
        id: String = Presence::Key, Rule::Length(0, ID);
        name: String = Presence::Required, Rule::Length(1, NAME);
        r#type: MachineType = Presence::Required;
        category: MachineCategory = Presence::Optional;
        brand: String = Presence::Optional, Rule::Length(0, 128);
        status: MachineStatus = Presence::Required;
        current_job_id: String = Presence::Optional, Rule::Length(0, ID);
        operator_ids: Vec<String> = Presence::Default(json!([]));
        efficiency: f64 = Presence::Default(json!(0)), Rule::Min(0.0), Rule::Max(100.0);
        oee_availability: f64 = Presence::Default(json!(0)), Rule::Min(0.0), Rule::Max(100.0);
        oee_performance: f64 = Presence::Default(json!(0)), Rule::Min(0.0), Rule::Max(100.0);
        oee_quality: f64 = Presence::Default(json!(0)), Rule::Min(0.0), Rule::Max(100.0);
        temperature: f64 = Presence::Optional;
        last_maintenance: String = Presence::Optional, Rule::Length(0, 32);
        maintenance_reason: String = Presence::Optional, Rule::Length(0, 256);
        is_active: bool = Presence::Default(json!(true));
        color: String = Presence::Optional, Rule::Length(0, 32);
        total_meters_produced: i64 = Presence::Default(json!(0)), Rule::Min(0.0);
        next_maintenance_meters: i64 = Presence::Default(json!(0)), Rule::Min(0.0);
    }
}

resource_schema! {
    JobFields {
        id: String = Presence::Key, Rule::Length(0, ID);
        project_id: String = Presence::Required, Rule::Length(1, ID);
        machine_type: MachineType = Presence::Required;
        assigned_machine_id: String = Presence::Optional, Rule::Length(0, ID);
        operator_ids: Vec<String> = Presence::Default(json!([]));
        product_name: String = Presence::Required, Rule::Length(1, NAME);
        target_quantity: i64 = Presence::Default(json!(0)), Rule::Min(0.0);
        completed_quantity: i64 = Presence::Default(json!(0)), Rule::Min(0.0);
        scrap_quantity: i64 = Presence::Optional, Rule::Min(0.0);
        unit: String = Presence::Required, Rule::Length(1, 32);
        status: JobStatus = Presence::Required;
        start_date: String = Presence::Optional, Rule::Length(0, 32);
        end_date: String = Presence::Optional, Rule::Length(0, 32);
        priority_index: i64 = Presence::Optional;
        file_url: String = Presence::Optional, Rule::Length(0, 512);
        notes: String = Presence::Optional, Rule::Length(0, TEXT);
        operator_notes: String = Presence::Optional, Rule::Length(0, TEXT);
        requires_panelizado: bool = Presence::Optional;
        linked_job_id: String = Presence::Optional, Rule::Length(0, ID);
        workflow_stages: Vec<WorkflowStage> = Presence::Default(json!([]));
        current_coil_id: String = Presence::Optional, Rule::Length(0, ID);
        is_stock: bool = Presence::Optional;
        tonnage: f64 = Presence::Optional, Rule::Min(0.0);
        completed_at: String = Presence::Optional, Rule::Length(0, 32);
    }
}

resource_schema! {
    ProjectFields {
        id: String = Presence::Key, Rule::Length(0, ID);
        name: String = Presence::Required, Rule::Length(1, NAME);
        client_id: String = Presence::Optional, Rule::Length(0, ID);
        deadline: String = Presence::Required, Rule::Length(1, 32);
        status: ProjectStatus = Presence::Required;
        description: String = Presence::Optional, Rule::Length(0, TEXT);
        budget: f64 = Presence::Optional, Rule::Min(0.0);
    }
}

resource_schema! {
    ClientFields {
        id: String = Presence::Key, Rule::Length(0, ID);
        name: String = Presence::Required, Rule::Length(1, NAME);
        contact_person: String = Presence::Required, Rule::Length(1, NAME);
        email: String = Presence::Required, Rule::Length(3, NAME), Rule::Email;
        phone: String = Presence::Required, Rule::Length(1, 64);
        address: String = Presence::Optional, Rule::Length(0, TEXT);
        tax_id: String = Presence::Optional, Rule::Length(0, 64);
    }
}

resource_schema! {
    InventoryFields {
        id: String = Presence::Key, Rule::Length(0, ID);
        name: String = Presence::Required, Rule::Length(1, NAME);
        sku: String = Presence::Required, Rule::Length(1, 64);
        quantity: i64 = Presence::Default(json!(0)), Rule::Min(0.0);
        unit: InventoryUnit = Presence::Required;
        min_threshold: i64 = Presence::Default(json!(0)), Rule::Min(0.0);
        location: String = Presence::Required, Rule::Length(1, NAME);
        is_manufactured: bool = Presence::Optional;
    }
}

resource_schema! {
    AlertFields {
        id: String = Presence::Key, Rule::Length(0, ID);
        r#type: AlertType = Presence::Required;
        message: String = Presence::Required, Rule::Length(1, TEXT);
        timestamp: String = Presence::Required, Rule::Length(1, 64);
        severity: AlertSeverity = Presence::Required;
        related_id: String = Presence::Optional, Rule::Length(0, ID);
    }
}

resource_schema! {
    EventFields {
        id: String = Presence::Key, Rule::Length(0, ID);
        timestamp: String = Presence::Required, Rule::Length(1, 64);
        machine_id: String = Presence::Required, Rule::Length(1, ID);
        r#type: EventType = Presence::Required;
        description: String = Presence::Required, Rule::Length(1, TEXT);
        severity: EventSeverity = Presence::Required;
    }
}

resource_schema! {
    MessageFields {
        id: String = Presence::Key, Rule::Length(0, ID);
        from: String = Presence::Required, Rule::Length(1, ID);
        to: String = Presence::Required, Rule::Length(1, ID);
        content: String = Presence::Required, Rule::Length(1, TEXT);
        timestamp: String = Presence::Required, Rule::Length(1, 64);
        is_read: bool = Presence::Default(json!(false));
    }
}

resource_schema! {
    ProjectAccessoryFields {
        id: String = Presence::Key, Rule::Length(0, ID);
        project_id: String = Presence::Required, Rule::Length(1, ID);
        inventory_item_id: String = Presence::Required, Rule::Length(1, ID);
        quantity_required: i64 = Presence::Required, Rule::Min(0.0);
        quantity_allocated: i64 = Presence::Default(json!(0)), Rule::Min(0.0);
        is_fulfilled: bool = Presence::Default(json!(false));
    }
}

resource_schema! {
    /// `POST /api/auth/login` body. Any PIN shape is accepted; lookup decides.
    LoginFields {
        pin: String = Presence::Required, Rule::Length(1, 32);
    }
}

/// Validate a request body for `resource`. Returns the canonical camelCase body.
pub fn validate_body(resource: Resource, mode: Mode, body: Value) -> Result<Map<String, Value>, AppError> {
    match resource {
        Resource::Users => validate::<UserFields>(body, mode),
        Resource::Machines => validate::<MachineFields>(body, mode),
        Resource::Jobs => validate::<JobFields>(body, mode),
        Resource::Projects => validate::<ProjectFields>(body, mode),
        Resource::Clients => validate::<ClientFields>(body, mode),
        Resource::Inventory => validate::<InventoryFields>(body, mode),
        Resource::Alerts => validate::<AlertFields>(body, mode),
        Resource::Events => validate::<EventFields>(body, mode),
        Resource::Messages => validate::<MessageFields>(body, mode),
        Resource::ProjectAccessories => validate::<ProjectAccessoryFields>(body, mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::to_snake_case;
    use crate::error::Violation;
    use crate::schema::{external_name, Schema};

    fn violations(result: Result<Map<String, Value>, AppError>) -> Vec<Violation> {
        match result {
            Err(AppError::Validation(v)) => v,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn user_create_echoes_role() {
        let out = validate_body(
            Resource::Users,
            Mode::Create,
            json!({ "name": "Ana", "role": "OPERATOR", "pin": "4321" }),
        )
        .unwrap();
        assert_eq!(out["role"], json!("OPERATOR"));
        assert_eq!(out["avatar"], Value::Null);
        assert_eq!(out["id"], Value::Null);
    }

    #[test]
    fn pin_must_be_four_digits() {
        for pin in ["123", "12345", "12ab", ""] {
            let v = violations(validate_body(
                Resource::Users,
                Mode::Update,
                json!({ "pin": pin }),
            ));
            assert_eq!(v[0].field, "pin", "{pin}");
        }
    }

    #[test]
    fn machine_efficiency_out_of_range() {
        let v = violations(validate_body(
            Resource::Machines,
            Mode::Update,
            json!({ "efficiency": 150 }),
        ));
        assert_eq!(v, vec![Violation::new("efficiency", "must be at most 100")]);
    }

    #[test]
    fn machine_create_fills_defaults() {
        let out = validate_body(
            Resource::Machines,
            Mode::Create,
            json!({ "name": "Conf. 4", "type": "CONFORMADORA", "status": "IDLE" }),
        )
        .unwrap();
        assert_eq!(out["operatorIds"], json!([]));
        assert_eq!(out["isActive"], json!(true));
        assert_eq!(out["oeeQuality"], json!(0));
        assert_eq!(out["category"], Value::Null);
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        let v = violations(validate_body(
            Resource::Jobs,
            Mode::Update,
            json!({ "status": "DONE" }),
        ));
        assert_eq!(v[0].field, "status");
        assert!(v[0].message.contains("unknown variant"), "{}", v[0].message);
    }

    #[test]
    fn workflow_stages_are_closed_maps() {
        let ok = validate_body(
            Resource::Jobs,
            Mode::Update,
            json!({ "workflowStages": [{ "name": "CORTE", "isCompleted": false }] }),
        )
        .unwrap();
        assert_eq!(ok["workflowStages"], json!([{ "name": "CORTE", "isCompleted": false }]));

        let v = violations(validate_body(
            Resource::Jobs,
            Mode::Update,
            json!({ "workflowStages": [{ "name": "CORTE", "isCompleted": false, "extra": 1 }] }),
        ));
        assert_eq!(v[0].field, "workflowStages");
    }

    #[test]
    fn negative_quantities_are_rejected() {
        let v = violations(validate_body(
            Resource::Inventory,
            Mode::Update,
            json!({ "quantity": -1, "minThreshold": -2 }),
        ));
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn message_fields_use_plain_names() {
        let out = validate_body(
            Resource::Messages,
            Mode::Create,
            json!({ "from": "U-001", "to": "U-002", "content": "hola", "timestamp": "2024-01-01T00:00:00Z" }),
        )
        .unwrap();
        assert_eq!(out["isRead"], json!(false));
        assert_eq!(out["from"], json!("U-001"));
    }

    #[test]
    fn client_email_shape() {
        let v = violations(validate_body(
            Resource::Clients,
            Mode::Update,
            json!({ "email": "nobody" }),
        ));
        assert_eq!(v, vec![Violation::new("email", "must be a valid email")]);
    }

    fn assert_fields_match_columns<S: Schema>(resource: Resource) {
        for declared in S::FIELDS {
            let column = to_snake_case(&external_name(declared));
            assert!(resource.column(&column).is_some(), "{resource}.{column}");
        }
        assert_eq!(S::FIELDS.len(), resource.columns().len(), "{resource}");
    }

    #[test]
    fn every_schema_field_is_a_column() {
        assert_fields_match_columns::<UserFields>(Resource::Users);
        assert_fields_match_columns::<MachineFields>(Resource::Machines);
        assert_fields_match_columns::<JobFields>(Resource::Jobs);
        assert_fields_match_columns::<ProjectFields>(Resource::Projects);
        assert_fields_match_columns::<ClientFields>(Resource::Clients);
        assert_fields_match_columns::<InventoryFields>(Resource::Inventory);
        assert_fields_match_columns::<AlertFields>(Resource::Alerts);
        assert_fields_match_columns::<EventFields>(Resource::Events);
        assert_fields_match_columns::<MessageFields>(Resource::Messages);
        assert_fields_match_columns::<ProjectAccessoryFields>(Resource::ProjectAccessories);
    }
}
