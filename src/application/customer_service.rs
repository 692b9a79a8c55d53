use uuid::Uuid;

use crate::domain::customer::{Customer, CustomerFilter, CustomerInput};
use crate::domain::deletion_guard::ensure_customer_deletable;
use crate::domain::errors::{
    DomainError, CUSTOMER_NOT_FOUND, EMAIL_TAKEN, NATIONAL_ID_TAKEN, PHONE_TAKEN,
};
use crate::domain::ports::CustomerRepository;

pub struct CustomerService<R> {
    repo: R,
}

impl<R: CustomerRepository> CustomerService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a customer. The stored record is always active.
    pub fn register(&self, candidate: CustomerInput) -> Result<Customer, DomainError> {
        let candidate = CustomerInput {
            active: true,
            ..candidate
        };
        candidate.validate()?;
        self.ensure_unique(&candidate, None)?;
        self.repo.insert(&candidate)
    }

    /// Replaces every attribute of an existing customer.
    pub fn update(&self, id: Uuid, replacement: CustomerInput) -> Result<Customer, DomainError> {
        if self.repo.find_by_id(id)?.is_none() {
            return Err(DomainError::not_found(CUSTOMER_NOT_FOUND));
        }
        replacement.validate()?;
        self.ensure_unique(&replacement, Some(id))?;
        self.repo
            .update(id, &replacement)?
            .ok_or_else(|| DomainError::not_found(CUSTOMER_NOT_FOUND))
    }

    pub fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete_with(id, ensure_customer_deletable)
    }

    pub fn list(&self, filter: &CustomerFilter) -> Result<Vec<Customer>, DomainError> {
        self.repo.list(filter)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        self.repo.find_by_id(id)
    }

    /// Email, then national ID, then phone. A match on `owner` itself is not
    /// a conflict.
    fn ensure_unique(&self, input: &CustomerInput, owner: Option<Uuid>) -> Result<(), DomainError> {
        let taken_by_other =
            |found: Option<Customer>| found.is_some_and(|c| Some(c.id) != owner);

        if taken_by_other(self.repo.find_by_email(&input.email)?) {
            return Err(DomainError::conflict(EMAIL_TAKEN));
        }
        if taken_by_other(self.repo.find_by_national_id(&input.national_id)?) {
            return Err(DomainError::conflict(NATIONAL_ID_TAKEN));
        }
        if taken_by_other(self.repo.find_by_phone(&input.phone)?) {
            return Err(DomainError::conflict(PHONE_TAKEN));
        }
        Ok(())
    }
}
