//! Collection definitions and role gating.
//!
//! # Design
//! - Every management screen is the same view driven by one `CollectionDef`.
//! - Paths follow the backend's route layout, which differs per collection.

use crate::features::collections::actions::MutationOp;
use warden_api_models::{EntityStatus, Role};

/// Collections the console can manage or browse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// End users, managed by admins.
    Users,
    /// Users assigned to the signed-in agent.
    AssignedUsers,
    /// Support agents.
    Agents,
    /// Administrators, managed by the super admin.
    Admins,
}

/// Table column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    /// Avatar plus name.
    Identity,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// Category (department for agents).
    Category,
    /// Lifecycle status badge.
    Status,
    /// Creation date.
    Joined,
    /// Row actions.
    Actions,
}

impl Column {
    /// Header label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Identity => "Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Category => "Department",
            Self::Status => "Status",
            Self::Joined => "Joined",
            Self::Actions => "Actions",
        }
    }
}

/// Enumerated category filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryFilter {
    /// Query parameter and body field name.
    pub param: &'static str,
    /// Label for the select.
    pub label: &'static str,
    /// Selectable values, excluding the sentinel.
    pub options: &'static [&'static str],
}

/// Everything the collection view needs to know about one collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectionDef {
    /// Which collection this is.
    pub kind: CollectionKind,
    /// Page heading.
    pub title: &'static str,
    /// Singular noun for dialogs and notices.
    pub singular: &'static str,
    /// List endpoint.
    pub list_path: &'static str,
    /// Base for `/{id}`, `/{id}/ban` and `/{id}/unban`.
    pub item_path: &'static str,
    /// Base for `PUT /{id}`; differs from `item_path` for users.
    pub update_path: &'static str,
    /// Create endpoint.
    pub create_path: &'static str,
    /// Key holding the items array in list responses.
    pub items_key: &'static str,
    /// Cache tag invalidated by mutations.
    pub tag: &'static str,
    /// Visible columns in order.
    pub columns: &'static [Column],
    /// Status filter values, excluding the sentinel.
    pub status_filters: &'static [EntityStatus],
    /// Optional category filter.
    pub category: Option<CategoryFilter>,
    /// Mutations offered on this screen.
    pub mutations: &'static [MutationOp],
    /// Ban reason sent when the dialog is left blank.
    pub default_ban_reason: &'static str,
    /// Role assigned to accounts created here.
    pub create_role: Option<Role>,
}

const STATUS_FILTERS: &[EntityStatus] = &[
    EntityStatus::Active,
    EntityStatus::Inactive,
    EntityStatus::Banned,
];

const MANAGE_ALL: &[MutationOp] = &[
    MutationOp::Create,
    MutationOp::Update,
    MutationOp::Ban,
    MutationOp::Unban,
    MutationOp::Delete,
];

/// Departments agents can belong to.
pub const AGENT_DEPARTMENTS: &[&str] = &["Support", "Sales", "Technical", "Marketing"];

static USERS: CollectionDef = CollectionDef {
    kind: CollectionKind::Users,
    title: "User Management",
    singular: "user",
    list_path: "admin/users",
    item_path: "admin/users",
    update_path: "admin/update",
    create_path: "admin/users",
    items_key: "users",
    tag: "users",
    columns: &[
        Column::Identity,
        Column::Email,
        Column::Phone,
        Column::Status,
        Column::Joined,
        Column::Actions,
    ],
    status_filters: STATUS_FILTERS,
    category: None,
    mutations: &[
        MutationOp::Update,
        MutationOp::Ban,
        MutationOp::Unban,
        MutationOp::Delete,
    ],
    default_ban_reason: "Policy violation - banned by admin",
    create_role: None,
};

static ASSIGNED_USERS: CollectionDef = CollectionDef {
    kind: CollectionKind::AssignedUsers,
    title: "My Users",
    singular: "user",
    list_path: "agent/users",
    item_path: "agent/users",
    update_path: "agent/users",
    create_path: "agent/users",
    items_key: "users",
    tag: "users",
    columns: &[
        Column::Identity,
        Column::Email,
        Column::Phone,
        Column::Status,
        Column::Joined,
    ],
    status_filters: STATUS_FILTERS,
    category: None,
    mutations: &[],
    default_ban_reason: "",
    create_role: None,
};

static AGENTS: CollectionDef = CollectionDef {
    kind: CollectionKind::Agents,
    title: "Agent Management",
    singular: "agent",
    list_path: "agents",
    item_path: "agents",
    update_path: "agents",
    create_path: "auth/create-agent",
    items_key: "agents",
    tag: "agents",
    columns: &[
        Column::Identity,
        Column::Email,
        Column::Category,
        Column::Status,
        Column::Joined,
        Column::Actions,
    ],
    status_filters: STATUS_FILTERS,
    category: Some(CategoryFilter {
        param: "department",
        label: "Department",
        options: AGENT_DEPARTMENTS,
    }),
    mutations: MANAGE_ALL,
    default_ban_reason: "Policy violation - banned by admin",
    create_role: Some(Role::Agent),
};

static ADMINS: CollectionDef = CollectionDef {
    kind: CollectionKind::Admins,
    title: "Admin Management",
    singular: "admin",
    list_path: "superadmin/alladmins",
    item_path: "superadmin/admins",
    update_path: "superadmin/admins",
    create_path: "auth/create-admin",
    items_key: "admins",
    tag: "admins",
    columns: &[
        Column::Identity,
        Column::Email,
        Column::Status,
        Column::Joined,
        Column::Actions,
    ],
    status_filters: STATUS_FILTERS,
    category: None,
    mutations: MANAGE_ALL,
    default_ban_reason: "Policy violation - banned by super admin",
    create_role: Some(Role::Admin),
};

impl CollectionKind {
    /// Definition backing this collection.
    #[must_use]
    pub fn def(self) -> &'static CollectionDef {
        match self {
            Self::Users => &USERS,
            Self::AssignedUsers => &ASSIGNED_USERS,
            Self::Agents => &AGENTS,
            Self::Admins => &ADMINS,
        }
    }

    /// Route segment for this collection.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::AssignedUsers => "my-users",
            Self::Agents => "agents",
            Self::Admins => "admins",
        }
    }

    /// Reverse of [`CollectionKind::slug`].
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        [Self::Users, Self::AssignedUsers, Self::Agents, Self::Admins]
            .into_iter()
            .find(|kind| kind.slug() == slug)
    }
}

impl CollectionDef {
    /// Category query parameter, if the collection has one.
    #[must_use]
    pub fn category_param(&self) -> Option<&'static str> {
        self.category.map(|filter| filter.param)
    }

    /// Whether the screen offers `op` at all.
    #[must_use]
    pub fn offers(&self, op: MutationOp) -> bool {
        self.mutations.contains(&op)
    }
}

/// Collections visible to `role`, landing collection first.
#[must_use]
pub const fn accessible_collections(role: Role) -> &'static [CollectionKind] {
    match role {
        Role::SuperAdmin => &[CollectionKind::Admins, CollectionKind::Agents],
        Role::Admin => &[CollectionKind::Agents, CollectionKind::Users],
        Role::Agent => &[CollectionKind::AssignedUsers],
        Role::User | Role::Unknown => &[],
    }
}

/// Where a freshly signed-in principal lands.
#[must_use]
pub fn landing_collection(role: Role) -> Option<CollectionKind> {
    accessible_collections(role).first().copied()
}

/// Whether `role` may open `kind`.
#[must_use]
pub fn can_access(role: Role, kind: CollectionKind) -> bool {
    accessible_collections(role).contains(&kind)
}

/// Mutations `role` may perform on `kind`.
#[must_use]
pub fn allowed_mutations(role: Role, kind: CollectionKind) -> &'static [MutationOp] {
    if can_access(role, kind) {
        kind.def().mutations
    } else {
        &[]
    }
}

/// Up to two initials for the avatar fallback.
#[must_use]
pub fn initials(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();
    if initials.is_empty() {
        "?".to_string()
    } else {
        initials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_see_their_collections() {
        assert_eq!(landing_collection(Role::SuperAdmin), Some(CollectionKind::Admins));
        assert_eq!(landing_collection(Role::Admin), Some(CollectionKind::Agents));
        assert_eq!(landing_collection(Role::Agent), Some(CollectionKind::AssignedUsers));
        assert_eq!(landing_collection(Role::User), None);
        assert!(can_access(Role::SuperAdmin, CollectionKind::Agents));
        assert!(!can_access(Role::SuperAdmin, CollectionKind::Users));
        assert!(!can_access(Role::Admin, CollectionKind::Admins));
    }

    #[test]
    fn agents_browse_read_only() {
        assert!(allowed_mutations(Role::Agent, CollectionKind::AssignedUsers).is_empty());
        assert!(allowed_mutations(Role::Agent, CollectionKind::Agents).is_empty());
        assert!(allowed_mutations(Role::Admin, CollectionKind::Agents).contains(&MutationOp::Ban));
    }

    #[test]
    fn only_agents_filter_by_department() {
        assert_eq!(CollectionKind::Agents.def().category_param(), Some("department"));
        assert_eq!(CollectionKind::Admins.def().category_param(), None);
        assert!(!CollectionKind::Users.def().offers(MutationOp::Create));
    }

    #[test]
    fn user_edits_use_the_update_route() {
        assert_eq!(CollectionKind::Users.def().update_path, "admin/update");
        assert_eq!(CollectionKind::Agents.def().update_path, "agents");
        assert_eq!(CollectionKind::Admins.def().update_path, "superadmin/admins");
    }

    #[test]
    fn slugs_round_trip() {
        for kind in [
            CollectionKind::Users,
            CollectionKind::AssignedUsers,
            CollectionKind::Agents,
            CollectionKind::Admins,
        ] {
            assert_eq!(CollectionKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(CollectionKind::from_slug("nope"), None);
    }

    #[test]
    fn initials_fall_back_sensibly() {
        assert_eq!(initials("ada lovelace byron"), "AL");
        assert_eq!(initials("  grace "), "G");
        assert_eq!(initials(""), "?");
    }
}
