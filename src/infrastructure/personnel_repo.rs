use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::id::RecordId;
use crate::domain::personnel::{DeliveryPersonnel, NewPersonnel, PersonnelRole};
use crate::domain::ports::PersonnelRepository;
use crate::schema::delivery_personnel;

use super::models::{NewPersonnelRow, PersonnelRow};
use super::stored_id;

fn into_personnel(row: PersonnelRow) -> Result<DeliveryPersonnel, DomainError> {
    Ok(DeliveryPersonnel {
        id: stored_id(row.id)?,
        name: row.name,
        email: row.email,
        password_hash: row.password_hash,
        contact_details: row.contact_details,
        vehicle_type: row.vehicle_type,
        is_available: row.is_available,
        token_version: row.token_version,
        role: row
            .role
            .parse()
            .map_err(|_| DomainError::Internal(format!("stored personnel role '{}'", row.role)))?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub struct DieselPersonnelRepository {
    pool: DbPool,
}

impl DieselPersonnelRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl PersonnelRepository for DieselPersonnelRepository {
    fn create(&self, personnel: NewPersonnel) -> Result<DeliveryPersonnel, DomainError> {
        let mut conn = self.pool.get()?;
        let row: PersonnelRow = diesel::insert_into(delivery_personnel::table)
            .values(&NewPersonnelRow {
                id: personnel.id.as_str(),
                name: &personnel.name,
                email: &personnel.email,
                password_hash: &personnel.password_hash,
                contact_details: Some(personnel.contact_details.as_str()),
                vehicle_type: Some(personnel.vehicle_type.as_str()),
                role: personnel.role.as_str(),
            })
            .returning(PersonnelRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    DomainError::invalid(format!("Email {} is already registered", personnel.email))
                }
                other => other.into(),
            })?;
        into_personnel(row)
    }

    fn find_by_id(&self, id: &RecordId) -> Result<Option<DeliveryPersonnel>, DomainError> {
        let mut conn = self.pool.get()?;
        delivery_personnel::table
            .filter(delivery_personnel::id.eq(id.as_str()))
            .select(PersonnelRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(into_personnel)
            .transpose()
    }

    fn find_by_email(&self, email: &str) -> Result<Option<DeliveryPersonnel>, DomainError> {
        let mut conn = self.pool.get()?;
        delivery_personnel::table
            .filter(delivery_personnel::email.eq(email))
            .select(PersonnelRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(into_personnel)
            .transpose()
    }

    fn list_by_role(&self, role: PersonnelRole) -> Result<Vec<DeliveryPersonnel>, DomainError> {
        let mut conn = self.pool.get()?;
        delivery_personnel::table
            .filter(delivery_personnel::role.eq(role.as_str()))
            .select(PersonnelRow::as_select())
            .order(delivery_personnel::created_at.asc())
            .load(&mut conn)?
            .into_iter()
            .map(into_personnel)
            .collect()
    }

    fn bump_token_version(&self, id: &RecordId) -> Result<Option<DeliveryPersonnel>, DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(delivery_personnel::table.filter(delivery_personnel::id.eq(id.as_str())))
            .set((
                delivery_personnel::token_version.eq(delivery_personnel::token_version + 1),
                delivery_personnel::updated_at.eq(diesel::dsl::now),
            ))
            .returning(PersonnelRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(into_personnel)
            .transpose()
    }

    fn set_availability(
        &self,
        id: &RecordId,
        is_available: bool,
    ) -> Result<Option<DeliveryPersonnel>, DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(delivery_personnel::table.filter(delivery_personnel::id.eq(id.as_str())))
            .set((
                delivery_personnel::is_available.eq(is_available),
                delivery_personnel::updated_at.eq(diesel::dsl::now),
            ))
            .returning(PersonnelRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(into_personnel)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::DieselPersonnelRepository;
    use crate::domain::errors::DomainError;
    use crate::domain::id::RecordId;
    use crate::domain::personnel::{NewPersonnel, PersonnelRole};
    use crate::domain::ports::PersonnelRepository;
    use crate::infrastructure::test_db::setup_db;

    fn courier(email: &str) -> NewPersonnel {
        NewPersonnel {
            id: RecordId::generate(),
            name: "Ravi".into(),
            email: email.into(),
            password_hash: "hash".into(),
            contact_details: "123-456-7890".into(),
            vehicle_type: "Motorcycle".into(),
            role: PersonnelRole::Delivery,
        }
    }

    #[tokio::test]
    async fn token_version_increments_atomically() {
        let (_container, pool) = setup_db().await;
        let repo = DieselPersonnelRepository::new(pool);
        let created = repo.create(courier("ravi@example.com")).unwrap();
        assert_eq!(created.token_version, 0);

        repo.bump_token_version(&created.id).unwrap();
        let bumped = repo.bump_token_version(&created.id).unwrap().unwrap();
        assert_eq!(bumped.token_version, 2);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_as_invalid_request() {
        let (_container, pool) = setup_db().await;
        let repo = DieselPersonnelRepository::new(pool);
        repo.create(courier("dup@example.com")).unwrap();

        let err = repo.create(courier("dup@example.com")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn set_availability_persists_flag() {
        let (_container, pool) = setup_db().await;
        let repo = DieselPersonnelRepository::new(pool);
        let created = repo.create(courier("avail@example.com")).unwrap();

        let updated = repo.set_availability(&created.id, false).unwrap().unwrap();
        assert!(!updated.is_available);
        let found = repo.find_by_email("avail@example.com").unwrap().unwrap();
        assert!(!found.is_available);
    }
}
