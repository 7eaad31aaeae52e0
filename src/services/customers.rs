use crate::{
    db::DbPool,
    entities::{
        customer::{self, ActiveModel as CustomerActiveModel, Entity as CustomerEntity},
        order::{self, Entity as OrderEntity},
        CustomerModel,
    },
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
}

/// Service managing the customers carts and orders belong to.
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_customer(
        &self,
        input: CreateCustomerInput,
    ) -> Result<CustomerModel, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let duplicate = CustomerEntity::find()
            .filter(customer::Column::Email.eq(input.email.clone()))
            .count(&*self.db_pool)
            .await?;
        if duplicate > 0 {
            return Err(ServiceError::Conflict(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let created = CustomerActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(input.email),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(customer_id = %created.id, "Customer created");
        Ok(created)
    }

    pub async fn get_customer(&self, customer_id: Uuid) -> Result<CustomerModel, ServiceError> {
        CustomerEntity::find_by_id(customer_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", customer_id)))
    }

    pub async fn list_customers(&self) -> Result<Vec<CustomerModel>, ServiceError> {
        let customers = CustomerEntity::find()
            .order_by_asc(customer::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(customers)
    }

    /// Deletes a customer. Refused while any of their orders remain,
    /// including an open cart.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn delete_customer(&self, customer_id: Uuid) -> Result<(), ServiceError> {
        let customer = self.get_customer(customer_id).await?;

        let referencing = OrderEntity::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .count(&*self.db_pool)
            .await?;
        if referencing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Customer {} still has {} order(s)",
                customer_id, referencing
            )));
        }

        CustomerEntity::delete_by_id(customer.id)
            .exec(&*self.db_pool)
            .await?;
        info!(customer_id = %customer_id, "Customer deleted");
        Ok(())
    }
}
