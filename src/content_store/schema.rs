//! SQLite schema definitions for the content database.
//!
//! The content database holds the page tree, the listing content elements
//! placed on pages, and the download records with their authors and
//! categories.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

// =============================================================================
// Version 1
// =============================================================================

const PAGES_TABLE_V1: Table = Table {
    name: "pages",
    columns: &[
        sqlite_column!("uid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "pid",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!(
            "sorting",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "hidden",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "deleted",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
    ],
    indices: &[("idx_pages_pid", "pid")],
    unique_constraints: &[],
};

const CONTENT_ELEMENTS_TABLE_V1: Table = Table {
    name: "content_elements",
    columns: &[
        sqlite_column!("uid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("pid", &SqlType::Integer, non_null = true),
        sqlite_column!("plugin", &SqlType::Text, non_null = true),
        sqlite_column!("header", &SqlType::Text),
        // JSON object of setting name to value
        sqlite_column!(
            "settings",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'{}'")
        ),
        sqlite_column!(
            "hidden",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "deleted",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
    ],
    indices: &[("idx_content_elements_pid", "pid")],
    unique_constraints: &[],
};

const AUTHORS_TABLE_V1: Table = Table {
    name: "authors",
    columns: &[
        sqlite_column!("uid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("email", &SqlType::Text),
    ],
    indices: &[],
    unique_constraints: &[],
};

/// Categories live in the shared CMS category table.
const CATEGORIES_TABLE_V1: Table = Table {
    name: "sys_category",
    columns: &[
        sqlite_column!("uid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!(
            "parent",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

const AUTHOR_FK: ForeignKey = ForeignKey {
    foreign_table: "authors",
    foreign_column: "uid",
    on_delete: ForeignKeyOnChange::SetNull,
};

const DOWNLOADS_TABLE_V1: Table = Table {
    name: "downloads",
    columns: &[
        sqlite_column!("uid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("pid", &SqlType::Integer, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!("file_path", &SqlType::Text),
        sqlite_column!("file_size", &SqlType::Integer),
        sqlite_column!("author_id", &SqlType::Integer, foreign_key = Some(&AUTHOR_FK)),
        sqlite_column!(
            "sorting",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "hidden",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "deleted",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_downloads_pid", "pid"),
        ("idx_downloads_author_id", "author_id"),
    ],
    unique_constraints: &[],
};

const DOWNLOAD_FK: ForeignKey = ForeignKey {
    foreign_table: "downloads",
    foreign_column: "uid",
    on_delete: ForeignKeyOnChange::Cascade,
};

const CATEGORY_FK: ForeignKey = ForeignKey {
    foreign_table: "sys_category",
    foreign_column: "uid",
    on_delete: ForeignKeyOnChange::Cascade,
};

const DOWNLOAD_CATEGORY_MM_TABLE_V1: Table = Table {
    name: "download_category_mm",
    columns: &[
        sqlite_column!(
            "download_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&DOWNLOAD_FK)
        ),
        sqlite_column!(
            "category_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&CATEGORY_FK)
        ),
        sqlite_column!(
            "sorting",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
    ],
    indices: &[("idx_download_category_mm_category", "category_id")],
    unique_constraints: &[&["download_id", "category_id"]],
};

pub const CONTENT_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[
        PAGES_TABLE_V1,
        CONTENT_ELEMENTS_TABLE_V1,
        AUTHORS_TABLE_V1,
        CATEGORIES_TABLE_V1,
        DOWNLOADS_TABLE_V1,
        DOWNLOAD_CATEGORY_MM_TABLE_V1,
    ],
}];
