//! Client database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{format_date, parse_date, Database, DbError, DbResult};
use crate::models::Client;

fn client_from_row(row: &Row<'_>) -> rusqlite::Result<ClientRow> {
    Ok(ClientRow {
        id: row.get(0)?,
        full_name: row.get(1)?,
        age: row.get(2)?,
        room_number: row.get(3)?,
        care_type: row.get(4)?,
        admission_date: row.get(5)?,
        nhs_number: row.get(6)?,
        gp_surgery: row.get(7)?,
        next_of_kin_name: row.get(8)?,
        next_of_kin_phone: row.get(9)?,
        notes: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

const CLIENT_COLUMNS: &str = "id, full_name, age, room_number, care_type, admission_date, \
     nhs_number, gp_surgery, next_of_kin_name, next_of_kin_phone, notes, created_at, updated_at";

impl Database {
    /// Insert a new client.
    pub fn insert_client(&self, client: &Client) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO clients (
                id, full_name, age, room_number, care_type, admission_date,
                nhs_number, gp_surgery, next_of_kin_name, next_of_kin_phone,
                notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                client.id,
                client.full_name,
                client.age,
                client.room_number,
                client.care_type,
                format_date(client.admission_date),
                client.nhs_number,
                client.gp_surgery,
                client.next_of_kin_name,
                client.next_of_kin_phone,
                client.notes,
                client.created_at,
                client.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing client.
    pub fn update_client(&self, client: &Client) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE clients SET
                full_name = ?2,
                age = ?3,
                room_number = ?4,
                care_type = ?5,
                admission_date = ?6,
                nhs_number = ?7,
                gp_surgery = ?8,
                next_of_kin_name = ?9,
                next_of_kin_phone = ?10,
                notes = ?11,
                updated_at = datetime('now')
            WHERE id = ?1
            "#,
            params![
                client.id,
                client.full_name,
                client.age,
                client.room_number,
                client.care_type,
                format_date(client.admission_date),
                client.nhs_number,
                client.gp_surgery,
                client.next_of_kin_name,
                client.next_of_kin_phone,
                client.notes,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a client by id.
    pub fn get_client(&self, id: &str) -> DbResult<Option<Client>> {
        self.conn
            .query_row(
                &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?"),
                [id],
                client_from_row,
            )
            .optional()?
            .map(Client::try_from)
            .transpose()
    }

    /// Get the client occupying a room, if any.
    pub fn get_client_by_room(&self, room_number: &str) -> DbResult<Option<Client>> {
        self.conn
            .query_row(
                &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE room_number = ?"),
                [room_number],
                client_from_row,
            )
            .optional()?
            .map(Client::try_from)
            .transpose()
    }

    /// List all clients.
    pub fn list_clients(&self) -> DbResult<Vec<Client>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY full_name"
        ))?;
        let rows = stmt.query_map([], client_from_row)?;

        let mut clients = Vec::new();
        for row in rows {
            clients.push(row?.try_into()?);
        }
        Ok(clients)
    }

    /// List clients whose id is in the given set.
    pub fn list_clients_by_ids(&self, ids: &[String]) -> DbResult<Vec<Client>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<&str> = ids.iter().map(|_| "?").collect();
        let sql = format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id IN ({}) ORDER BY full_name",
            placeholders.join(", ")
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(ids.iter()), client_from_row)?;

        let mut clients = Vec::new();
        for row in rows {
            clients.push(row?.try_into()?);
        }
        Ok(clients)
    }

    /// All occupied room numbers.
    pub fn list_occupied_rooms(&self) -> DbResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT room_number FROM clients ORDER BY room_number")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a client.
    pub fn delete_client(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM clients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct ClientRow {
    id: String,
    full_name: String,
    age: u32,
    room_number: String,
    care_type: String,
    admission_date: String,
    nhs_number: Option<String>,
    gp_surgery: Option<String>,
    next_of_kin_name: Option<String>,
    next_of_kin_phone: Option<String>,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ClientRow> for Client {
    type Error = DbError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        Ok(Client {
            id: row.id,
            full_name: row.full_name,
            age: row.age,
            room_number: row.room_number,
            care_type: row.care_type,
            admission_date: parse_date(&row.admission_date)?,
            nhs_number: row.nhs_number,
            gp_surgery: row.gp_surgery,
            next_of_kin_name: row.next_of_kin_name,
            next_of_kin_phone: row.next_of_kin_phone,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
