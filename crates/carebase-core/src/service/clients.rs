//! Client operations.

use crate::models::{AuditEntry, CallerIdentity, Client, RoomOccupancy};
use crate::policy::{authorize, scope_for, Action, RecordScope, ResourceKind};
use crate::{CoreError, CoreResult};

use super::CareService;

impl CareService {
    /// Create a client. The room must be free.
    pub fn create_client(&self, caller: &CallerIdentity, client: &Client) -> CoreResult<Client> {
        authorize(caller.role, Action::Create, ResourceKind::Client)?;

        if self.db().get_client_by_room(&client.room_number)?.is_some() {
            return Err(CoreError::Conflict(format!(
                "Room {} is already occupied",
                client.room_number
            )));
        }

        self.db().insert_client(client)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Created client".into(),
                ResourceKind::Client.as_str().into(),
                client.id.clone(),
            )
            .with_client(client.id.clone())
            .with_detail(client.full_name.clone()),
        );

        Ok(client.clone())
    }

    /// List clients visible to the caller.
    pub fn list_clients(&self, caller: &CallerIdentity) -> CoreResult<Vec<Client>> {
        authorize(caller.role, Action::Read, ResourceKind::Client)?;

        match scope_for(caller, ResourceKind::Client)? {
            RecordScope::All => Ok(self.db().list_clients()?),
            RecordScope::Clients(ids) => Ok(self.db().list_clients_by_ids(&ids)?),
            RecordScope::StaffSelf(_) => Ok(Vec::new()),
        }
    }

    /// Get one client.
    pub fn get_client(&self, caller: &CallerIdentity, id: &str) -> CoreResult<Client> {
        authorize(caller.role, Action::Read, ResourceKind::Client)?;

        let client = self
            .db()
            .get_client(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Client {}", id)))?;

        let scope = scope_for(caller, ResourceKind::Client)?;
        if !scope.permits_client(&client.id) {
            return Err(CoreError::Forbidden(
                "Client record is outside the caller's scope".into(),
            ));
        }

        Ok(client)
    }

    /// Update a client.
    pub fn update_client(&self, caller: &CallerIdentity, client: &Client) -> CoreResult<Client> {
        authorize(caller.role, Action::Update, ResourceKind::Client)?;

        let existing = self
            .db()
            .get_client(&client.id)?
            .ok_or_else(|| CoreError::NotFound(format!("Client {}", client.id)))?;

        // Moving rooms re-runs the conflict check
        if existing.room_number != client.room_number
            && self.db().get_client_by_room(&client.room_number)?.is_some()
        {
            return Err(CoreError::Conflict(format!(
                "Room {} is already occupied",
                client.room_number
            )));
        }

        self.db().update_client(client)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Updated client".into(),
                ResourceKind::Client.as_str().into(),
                client.id.clone(),
            )
            .with_client(client.id.clone())
            .with_detail(client.full_name.clone()),
        );

        Ok(client.clone())
    }

    /// Delete a client (Admin only, per the policy table).
    pub fn delete_client(&self, caller: &CallerIdentity, id: &str) -> CoreResult<()> {
        authorize(caller.role, Action::Delete, ResourceKind::Client)?;

        let existing = self
            .db()
            .get_client(id)?
            .ok_or_else(|| CoreError::NotFound(format!("Client {}", id)))?;

        self.db().delete_client(id)?;

        self.record_audit(
            AuditEntry::new(
                caller.email.clone(),
                "Deleted client".into(),
                ResourceKind::Client.as_str().into(),
                id.to_string(),
            )
            .with_client(id.to_string())
            .with_detail(existing.full_name),
        );

        Ok(())
    }

    /// Room usage summary.
    pub fn room_occupancy(&self, caller: &CallerIdentity) -> CoreResult<RoomOccupancy> {
        authorize(caller.role, Action::Read, ResourceKind::Client)?;
        let occupied = self.db().list_occupied_rooms()?;
        Ok(RoomOccupancy::from_occupied(occupied))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::models::Role;

    fn make_client(name: &str, room: &str) -> Client {
        Client::new(
            name.into(),
            84,
            room.into(),
            "Residential".into(),
            day(2024, 3, 1),
        )
    }

    #[test]
    fn test_create_and_audit() {
        let service = CareService::open_in_memory().unwrap();
        let created = service
            .create_client(&admin(), &make_client("Edith Moore", "12"))
            .unwrap();

        let logs = service.db().list_audit_entries(Some("Client")).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, "Created client");
        assert_eq!(logs[0].target_id, created.id);
    }

    #[test]
    fn test_room_conflict() {
        let service = CareService::open_in_memory().unwrap();
        service
            .create_client(&admin(), &make_client("Edith Moore", "12"))
            .unwrap();

        let result = service.create_client(&admin(), &make_client("Ron Pike", "12"));
        assert!(matches!(result, Err(CoreError::Conflict(_))));
    }

    #[test]
    fn test_scoped_listing() {
        let service = CareService::open_in_memory().unwrap();
        let a = service
            .create_client(&admin(), &make_client("Edith Moore", "12"))
            .unwrap();
        service
            .create_client(&admin(), &make_client("Ron Pike", "13"))
            .unwrap();

        let visible = service.list_clients(&client_caller(&[&a.id])).unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, a.id);

        // Empty attached set: empty success, not an error
        let none = service.list_clients(&client_caller(&[])).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_get_outside_scope_is_forbidden() {
        let service = CareService::open_in_memory().unwrap();
        let a = service
            .create_client(&admin(), &make_client("Edith Moore", "12"))
            .unwrap();
        let b = service
            .create_client(&admin(), &make_client("Ron Pike", "13"))
            .unwrap();

        let caller = client_caller(&[&a.id]);
        assert!(service.get_client(&caller, &a.id).is_ok());
        let result = service.get_client(&caller, &b.id);
        assert!(matches!(result, Err(CoreError::Forbidden(_))));
    }

    #[test]
    fn test_delete_requires_admin() {
        let service = CareService::open_in_memory().unwrap();
        let created = service
            .create_client(&admin(), &make_client("Edith Moore", "12"))
            .unwrap();

        let result = service.delete_client(&staff(), &created.id);
        assert!(matches!(result, Err(CoreError::Forbidden(_))));

        service.delete_client(&admin(), &created.id).unwrap();
        assert!(matches!(
            service.get_client(&admin(), &created.id),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_room_occupancy() {
        let service = CareService::open_in_memory().unwrap();
        service
            .create_client(&admin(), &make_client("Edith Moore", "12"))
            .unwrap();

        let occupancy = service.room_occupancy(&staff()).unwrap();
        assert_eq!(occupancy.current_occupancy, 1);
        assert_eq!(occupancy.occupied_rooms, vec!["12".to_string()]);

        // External has organization-wide read on clients
        assert!(service.room_occupancy(&external()).is_ok());
        // Family may read but create is rejected
        let family = CallerIdentity::new("u".into(), "f@example.com".into(), Role::Family);
        assert!(service
            .create_client(&family, &make_client("May Holt", "14"))
            .is_err());
    }
}
