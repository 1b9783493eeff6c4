use super::{lock, ContentElement, ContentElementStore, GuardedConnection, ListingPlugin};
use crate::listing::ListingSettings;
use anyhow::{bail, Context, Result};
use rusqlite::{params, OptionalExtension};

/// Listing plugins backed by the `content_elements` table.
#[derive(Clone)]
pub struct SqliteContentElementStore {
    conn: GuardedConnection,
}

impl SqliteContentElementStore {
    pub fn new(conn: GuardedConnection) -> Self {
        Self { conn }
    }
}

impl ContentElementStore for SqliteContentElementStore {
    fn get_content_element(&self, uid: u32) -> Result<Option<ContentElement>> {
        let conn = lock(&self.conn)?;
        let row = conn
            .query_row(
                "SELECT uid, pid, plugin, header, settings FROM content_elements \
                 WHERE uid = ?1 AND hidden = 0 AND deleted = 0",
                params![uid],
                |row| {
                    Ok((
                        row.get::<_, u32>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((uid, pid, plugin, header, settings)) = row else {
            return Ok(None);
        };

        let Some(plugin) = ListingPlugin::parse(&plugin) else {
            bail!("Content element {} has unknown plugin '{}'", uid, plugin);
        };
        let settings: ListingSettings = serde_json::from_str(&settings)
            .with_context(|| format!("Invalid settings of content element {}", uid))?;

        Ok(Some(ContentElement {
            uid,
            pid,
            plugin,
            header,
            settings,
        }))
    }
}
