//! Static resource registry: URL segment -> table, column catalogue, JSON columns, sortable allowlist.
//! Pure lookups; an unknown segment is `None`, never an error.

use uuid::Uuid;

/// One URL-addressable entity kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Machines,
    Jobs,
    Projects,
    Clients,
    Inventory,
    Alerts,
    Events,
    Messages,
    ProjectAccessories,
}

/// Storage kind of a column. Drives bind coercion and row decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
    Bool,
    /// List value persisted as JSON text.
    Json,
}

#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn text(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Text }
}

const fn int(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Integer }
}

const fn real(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Real }
}

const fn boolean(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Bool }
}

const fn json(name: &'static str) -> Column {
    Column { name, kind: ColumnKind::Json }
}

/// Primary key column shared by every table.
pub const PK: &str = "id";

const USERS: &[Column] = &[text("id"), text("name"), text("role"), text("pin"), text("avatar")];

const MACHINES: &[Column] = &[
    text("id"),
    text("name"),
    text("type"),
    text("category"),
    text("brand"),
    text("status"),
    text("current_job_id"),
    json("operator_ids"),
    real("efficiency"),
    real("oee_availability"),
    real("oee_performance"),
    real("oee_quality"),
    real("temperature"),
    text("last_maintenance"),
    text("maintenance_reason"),
    boolean("is_active"),
    text("color"),
    int("total_meters_produced"),
    int("next_maintenance_meters"),
];

const JOBS: &[Column] = &[
    text("id"),
    text("project_id"),
    text("machine_type"),
    text("assigned_machine_id"),
    json("operator_ids"),
    text("product_name"),
    int("target_quantity"),
    int("completed_quantity"),
    int("scrap_quantity"),
    text("unit"),
    text("status"),
    text("start_date"),
    text("end_date"),
    int("priority_index"),
    text("file_url"),
    text("notes"),
    text("operator_notes"),
    boolean("requires_panelizado"),
    text("linked_job_id"),
    json("workflow_stages"),
    text("current_coil_id"),
    boolean("is_stock"),
    real("tonnage"),
    text("completed_at"),
];

const PROJECTS: &[Column] = &[
    text("id"),
    text("name"),
    text("client_id"),
    text("deadline"),
    text("status"),
    text("description"),
    real("budget"),
];

const CLIENTS: &[Column] = &[
    text("id"),
    text("name"),
    text("contact_person"),
    text("email"),
    text("phone"),
    text("address"),
    text("tax_id"),
];

const INVENTORY: &[Column] = &[
    text("id"),
    text("name"),
    text("sku"),
    int("quantity"),
    text("unit"),
    int("min_threshold"),
    text("location"),
    boolean("is_manufactured"),
];

const ALERTS: &[Column] = &[
    text("id"),
    text("type"),
    text("message"),
    text("timestamp"),
    text("severity"),
    text("related_id"),
];

const EVENTS: &[Column] = &[
    text("id"),
    text("timestamp"),
    text("machine_id"),
    text("type"),
    text("description"),
    text("severity"),
];

const MESSAGES: &[Column] = &[
    text("id"),
    text("from"),
    text("to"),
    text("content"),
    text("timestamp"),
    boolean("is_read"),
];

const PROJECT_ACCESSORIES: &[Column] = &[
    text("id"),
    text("project_id"),
    text("inventory_item_id"),
    int("quantity_required"),
    int("quantity_allocated"),
    boolean("is_fulfilled"),
];

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::Users,
        Resource::Machines,
        Resource::Jobs,
        Resource::Projects,
        Resource::Clients,
        Resource::Inventory,
        Resource::Alerts,
        Resource::Events,
        Resource::Messages,
        Resource::ProjectAccessories,
    ];

    /// Look up a resource by its URL path segment (kebab-case).
    pub fn from_path(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.path_segment() == segment)
    }

    pub fn path_segment(self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Machines => "machines",
            Resource::Jobs => "jobs",
            Resource::Projects => "projects",
            Resource::Clients => "clients",
            Resource::Inventory => "inventory",
            Resource::Alerts => "alerts",
            Resource::Events => "events",
            Resource::Messages => "messages",
            Resource::ProjectAccessories => "project-accessories",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            Resource::ProjectAccessories => "project_accessories",
            other => other.path_segment(),
        }
    }

    pub fn columns(self) -> &'static [Column] {
        match self {
            Resource::Users => USERS,
            Resource::Machines => MACHINES,
            Resource::Jobs => JOBS,
            Resource::Projects => PROJECTS,
            Resource::Clients => CLIENTS,
            Resource::Inventory => INVENTORY,
            Resource::Alerts => ALERTS,
            Resource::Events => EVENTS,
            Resource::Messages => MESSAGES,
            Resource::ProjectAccessories => PROJECT_ACCESSORIES,
        }
    }

    pub fn column(self, name: &str) -> Option<&'static Column> {
        self.columns().iter().find(|c| c.name == name)
    }

    /// Columns whose persisted text is a JSON list.
    pub fn json_columns(self) -> &'static [&'static str] {
        match self {
            Resource::Machines => &["operator_ids"],
            Resource::Jobs => &["operator_ids", "workflow_stages"],
            _ => &[],
        }
    }

    /// Internal (snake_case) column names accepted as `orderBy`.
    pub fn sortable_fields(self) -> &'static [&'static str] {
        match self {
            Resource::Users => &["id", "name", "role"],
            Resource::Machines => &["id", "name", "type", "status", "efficiency"],
            Resource::Jobs => &[
                "id",
                "status",
                "priority_index",
                "start_date",
                "end_date",
                "product_name",
                "project_id",
                "completed_at",
            ],
            Resource::Projects => &["id", "name", "deadline", "status"],
            Resource::Clients => &["id", "name", "email"],
            Resource::Inventory => &["id", "name", "sku", "quantity", "location"],
            Resource::Alerts => &["id", "timestamp", "severity", "type"],
            Resource::Events => &["id", "timestamp", "severity", "type", "machine_id"],
            Resource::Messages => &["id", "timestamp", "is_read"],
            Resource::ProjectAccessories => &["id", "project_id", "inventory_item_id"],
        }
    }

    pub fn is_sortable(self, column: &str) -> bool {
        self.sortable_fields().contains(&column)
    }

    /// First three letters of the upper-cased table name, e.g. "USE" for users.
    pub fn id_prefix(self) -> String {
        self.table().to_uppercase().chars().take(3).collect()
    }

    /// Fresh primary key: `{prefix}-{8 hex chars}`.
    pub fn new_id(self) -> String {
        let hex = Uuid::new_v4().simple().to_string();
        format!("{}-{}", self.id_prefix(), &hex[..8])
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path_segment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn resolves_path_segments() {
        assert_eq!(Resource::from_path("project-accessories"), Some(Resource::ProjectAccessories));
        assert_eq!(Resource::ProjectAccessories.table(), "project_accessories");
        assert_eq!(Resource::from_path("project_accessories"), None);
        assert_eq!(Resource::from_path("widgets"), None);
    }

    #[test]
    fn generated_ids_carry_table_prefix() {
        let re = Regex::new(r"^USE-[0-9a-f]{8}$").unwrap();
        assert!(re.is_match(&Resource::Users.new_id()));
        assert_eq!(Resource::Inventory.id_prefix(), "INV");
        assert_eq!(Resource::ProjectAccessories.id_prefix(), "PRO");
    }

    #[test]
    fn json_and_sortable_columns_exist_in_catalogue() {
        for r in Resource::ALL {
            for name in r.json_columns() {
                assert_eq!(r.column(name).map(|c| c.kind), Some(ColumnKind::Json), "{r}.{name}");
            }
            let declared = r.columns().iter().filter(|c| c.kind == ColumnKind::Json).count();
            assert_eq!(declared, r.json_columns().len(), "{r}");
            for name in r.sortable_fields() {
                assert!(r.column(name).is_some(), "{r}.{name}");
            }
            assert_eq!(r.columns()[0].name, PK);
        }
    }
}
