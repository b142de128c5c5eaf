use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{NewUser, User};
use crate::schema::users;

use super::models::{NewUserRow, UserRow};
use super::stored_id;

fn into_user(row: UserRow) -> Result<User, DomainError> {
    let corrupt = |field: &str, value: &str| {
        DomainError::Internal(format!("stored user {} '{}'", field, value))
    };
    Ok(User {
        id: stored_id(row.id)?,
        role: row.role.parse().map_err(|_| corrupt("role", &row.role))?,
        gender: row
            .gender
            .as_deref()
            .map(|g| g.parse().map_err(|_| corrupt("gender", g)))
            .transpose()?,
        status: row.status.parse().map_err(|_| corrupt("status", &row.status))?,
        first_name: row.first_name,
        last_name: row.last_name,
        email: row.email,
        password_hash: row.password_hash,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for DieselUserRepository {
    fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;
        let row: UserRow = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: user.id.as_str(),
                first_name: &user.first_name,
                last_name: user.last_name.as_deref(),
                email: &user.email,
                password_hash: &user.password_hash,
                role: user.role.as_str(),
                gender: user.gender.map(|g| g.as_str()),
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    DomainError::invalid(format!("Email {} is already registered", user.email))
                }
                other => other.into(),
            })?;
        into_user(row)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(into_user)
            .transpose()
    }
}
