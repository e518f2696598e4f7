//! Named permissions that can be granted to users

use serde::{Deserialize, Serialize};

/// Application label prefixed to every permission codename
pub const APP_LABEL: &str = "catalog";

/// Catalogue of custom permissions, per model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Permission {
    // Author
    ViewAuthor,
    CreateAuthor,
    EditAuthor,
    DeleteAuthor,
    // Book
    View,
    Create,
    Edit,
    Delete,
    AddBook,
    ChangeBook,
    DeleteBook,
    // Library
    ViewLibrary,
    CreateLibrary,
    EditLibrary,
    DeleteLibrary,
}

impl Permission {
    pub const ALL: [Permission; 15] = [
        Permission::ViewAuthor,
        Permission::CreateAuthor,
        Permission::EditAuthor,
        Permission::DeleteAuthor,
        Permission::View,
        Permission::Create,
        Permission::Edit,
        Permission::Delete,
        Permission::AddBook,
        Permission::ChangeBook,
        Permission::DeleteBook,
        Permission::ViewLibrary,
        Permission::CreateLibrary,
        Permission::EditLibrary,
        Permission::DeleteLibrary,
    ];

    /// Codename without the application label
    pub fn codename(&self) -> &'static str {
        match self {
            Permission::ViewAuthor => "can_view_author",
            Permission::CreateAuthor => "can_create_author",
            Permission::EditAuthor => "can_edit_author",
            Permission::DeleteAuthor => "can_delete_author",
            Permission::View => "can_view",
            Permission::Create => "can_create",
            Permission::Edit => "can_edit",
            Permission::Delete => "can_delete",
            Permission::AddBook => "can_add_book",
            Permission::ChangeBook => "can_change_book",
            Permission::DeleteBook => "can_delete_book",
            Permission::ViewLibrary => "can_view_library",
            Permission::CreateLibrary => "can_create_library",
            Permission::EditLibrary => "can_edit_library",
            Permission::DeleteLibrary => "can_delete_library",
        }
    }

    /// Full name as stored and checked: `catalog.<codename>`
    pub fn qualified(&self) -> String {
        format!("{}.{}", APP_LABEL, self.codename())
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", APP_LABEL, self.codename())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    /// Accepts the codename with or without the application label
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let codename = s
            .strip_prefix(APP_LABEL)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(s);
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.codename() == codename)
            .ok_or_else(|| format!("Unknown permission: {}", s))
    }
}

impl TryFrom<String> for Permission {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Permission> for String {
    fn from(permission: Permission) -> Self {
        permission.qualified()
    }
}
