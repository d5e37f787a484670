//! Queries against the EVE Static Data Export (SQLite dump)

use rusqlite::types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Result, ToSql};

use crate::models::{Ingredient, ItemId};

/// Manufacturing (1) and reactions (11); invention and copying are ignored
const PRODUCTION_ACTIVITIES: &str = "(1, 11)";

impl ToSql for ItemId {
    fn to_sql(&self) -> Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0 as i64))
    }
}

impl FromSql for ItemId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(|id| ItemId(id as u64))
    }
}

/// All types listed under a market group or any of its descendants
pub fn market_group_types(conn: &Connection, root_group: i64) -> Result<Vec<(ItemId, String)>> {
    let mut stmt = conn.prepare(
        "WITH RECURSIVE
           sub_group(group_id) AS (
             SELECT ?1
             UNION ALL
             SELECT g.marketGroupID
             FROM invMarketGroups g
             JOIN sub_group ON g.parentGroupID = sub_group.group_id
           )
         SELECT typeID, typeName
         FROM invTypes
         WHERE marketGroupID IN (SELECT group_id FROM sub_group)
         ORDER BY typeID",
    )?;

    let rows = stmt.query_map([root_group], |row| Ok((row.get(0)?, row.get(1)?)))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Blueprint or reaction formula that produces a type
pub fn producing_blueprint(conn: &Connection, product: ItemId) -> Result<Option<ItemId>> {
    conn.query_row(
        &format!(
            "SELECT typeID FROM industryActivityProducts
             WHERE productTypeID = ?1 AND activityID IN {PRODUCTION_ACTIVITIES}
             LIMIT 1"
        ),
        [product],
        |row| row.get(0),
    )
    .optional()
}

/// Units produced by one run of a blueprint
pub fn blueprint_output(conn: &Connection, blueprint: ItemId) -> Result<Option<u64>> {
    let quantity: Option<i64> = conn
        .query_row(
            &format!(
                "SELECT quantity FROM industryActivityProducts
                 WHERE typeID = ?1 AND activityID IN {PRODUCTION_ACTIVITIES}
                 LIMIT 1"
            ),
            [blueprint],
            |row| row.get(0),
        )
        .optional()?;
    Ok(quantity.and_then(|q| u64::try_from(q).ok()))
}

/// Materials consumed by one run of a blueprint
pub fn blueprint_materials(conn: &Connection, blueprint: ItemId) -> Result<Vec<Ingredient>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT quantity, materialTypeID FROM industryActivityMaterials
         WHERE typeID = ?1 AND activityID IN {PRODUCTION_ACTIVITIES}"
    ))?;

    let rows = stmt.query_map([blueprint], |row| {
        Ok(Ingredient {
            quantity: row.get(0)?,
            item: row.get(1)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

pub fn type_name(conn: &Connection, id: ItemId) -> Result<Option<String>> {
    conn.query_row("SELECT typeName FROM invTypes WHERE typeID = ?1", [id], |row| {
        row.get(0)
    })
    .optional()
}

/// A small SDE subset: Rifter and Wolf with a reaction in the Wolf's tree
#[cfg(test)]
pub(crate) fn fixture() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE invMarketGroups (
            marketGroupID INTEGER PRIMARY KEY,
            parentGroupID INTEGER,
            marketGroupName TEXT
        );
        CREATE TABLE invTypes (
            typeID INTEGER PRIMARY KEY,
            typeName TEXT,
            marketGroupID INTEGER
        );
        CREATE TABLE industryActivityProducts (
            typeID INTEGER,
            activityID INTEGER,
            productTypeID INTEGER,
            quantity INTEGER
        );
        CREATE TABLE industryActivityMaterials (
            typeID INTEGER,
            activityID INTEGER,
            materialTypeID INTEGER,
            quantity INTEGER
        );

        INSERT INTO invMarketGroups VALUES
            (4, NULL, 'Ship'),
            (61, 4, 'Frigates'),
            (1361, 61, 'Minmatar'),
            (9, NULL, 'Ship Equipment');

        INSERT INTO invTypes VALUES
            (34, 'Tritanium', 1857),
            (35, 'Pyerite', 1857),
            (587, 'Rifter', 1361),
            (691, 'Rifter Blueprint', NULL),
            (2048, 'Damage Control I', 9),
            (11371, 'Wolf', 1361),
            (11372, 'Wolf Blueprint', NULL),
            (11399, 'Morphite', 1857),
            (11539, 'Nanoelectrical Microprocessor', NULL),
            (11540, 'Nanoelectrical Microprocessor Blueprint', NULL),
            (16634, 'Atmospheric Gases', NULL),
            (16679, 'Fullerides', NULL),
            (46209, 'Fullerides Reaction Formula', NULL);

        INSERT INTO industryActivityProducts VALUES
            (691, 1, 587, 1),
            (11372, 1, 11371, 1),
            (11540, 1, 11539, 10),
            (46209, 11, 16679, 3000);

        INSERT INTO industryActivityMaterials VALUES
            (691, 1, 34, 32000),
            (691, 1, 35, 6000),
            (691, 8, 20171, 2),
            (11372, 1, 587, 1),
            (11372, 1, 11539, 15),
            (11372, 1, 11399, 40),
            (11540, 1, 16679, 5),
            (11540, 1, 35, 100),
            (46209, 11, 16634, 100);
        "#,
    )
    .unwrap();
    conn
}
