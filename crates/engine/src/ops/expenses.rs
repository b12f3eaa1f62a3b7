use chrono::Utc;
use sea_orm::{ConnectionTrait, TransactionTrait};

use crate::{
    EngineError, Expense, ExpenseUpdate, Farm, Money, NewExpense, ResultEngine,
    documents::{self, CollectionPath},
    expenses::ExpenseDocument,
    util::normalize_optional_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Lists every valid expense of a farm, tagged with the farm's name.
    ///
    /// Fails with `KeyNotFound` when the farm does not belong to the user.
    pub async fn list_expenses(&self, farm_id: &str, user_id: &str) -> ResultEngine<Vec<Expense>> {
        let farm = self.require_farm(&self.database, farm_id, user_id).await?;
        list_expenses_in(&self.database, &farm, user_id).await
    }

    pub async fn expense(
        &self,
        farm_id: &str,
        expense_id: &str,
        user_id: &str,
    ) -> ResultEngine<Expense> {
        let farm = self.require_farm(&self.database, farm_id, user_id).await?;
        self.require_expense(&self.database, &farm, expense_id, user_id)
            .await
    }

    /// Records an expense against one of the user's farms.
    pub async fn new_expense(
        &self,
        farm_id: &str,
        input: &NewExpense,
        user_id: &str,
    ) -> ResultEngine<Expense> {
        let farm = self.require_farm(&self.database, farm_id, user_id).await?;
        let path = CollectionPath::expenses(user_id, &farm.id)?;
        let stored = ExpenseDocument::new(input, Utc::now())?;
        let id = documents::insert(&self.database, &path, documents::encode(&stored)?).await?;
        tracing::info!(
            "user {user_id} recorded expense {id} of {} on farm {farm_id}",
            input.amount
        );
        self.require_expense(&self.database, &farm, &id, user_id)
            .await
    }

    pub async fn update_expense(
        &self,
        farm_id: &str,
        expense_id: &str,
        update: &ExpenseUpdate,
        user_id: &str,
    ) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let farm = self.require_farm(&db_tx, farm_id, user_id).await?;
            let mut expense = self
                .require_expense(&db_tx, &farm, expense_id, user_id)
                .await?;

            if let Some(amount) = update.amount {
                expense.amount = Money::try_from_minor(amount.minor())?;
            }
            if let Some(category) = update.category {
                expense.category = category;
            }
            if let Some(status) = update.payment_status {
                expense.payment_status = status;
            }
            if let Some(date) = update.date {
                expense.date = date;
            }
            if let Some(description) = &update.description {
                expense.description = normalize_optional_text(description.as_deref());
            }

            let path = CollectionPath::expenses(user_id, farm_id)?;
            let data = documents::encode(&ExpenseDocument::from_expense(&expense))?;
            if !documents::replace(&db_tx, &path, expense_id, data).await? {
                return Err(EngineError::KeyNotFound("expense not exists".to_string()));
            }
            Ok(expense)
        })
    }

    pub async fn delete_expense(
        &self,
        farm_id: &str,
        expense_id: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        let farm = self.require_farm(&self.database, farm_id, user_id).await?;
        let path = CollectionPath::expenses(user_id, &farm.id)?;
        if !documents::delete(&self.database, &path, expense_id).await? {
            return Err(EngineError::KeyNotFound("expense not exists".to_string()));
        }
        tracing::info!("user {user_id} deleted expense {expense_id} on farm {farm_id}");
        Ok(())
    }

    async fn require_expense<C>(
        &self,
        db: &C,
        farm: &Farm,
        expense_id: &str,
        user_id: &str,
    ) -> ResultEngine<Expense>
    where
        C: ConnectionTrait,
    {
        let path = CollectionPath::expenses(user_id, &farm.id)?;
        let document = documents::get(db, &path, expense_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        Expense::from_document(document, farm)
    }
}

pub(super) async fn list_expenses_in<C>(
    db: &C,
    farm: &Farm,
    user_id: &str,
) -> ResultEngine<Vec<Expense>>
where
    C: ConnectionTrait,
{
    let path = CollectionPath::expenses(user_id, &farm.id)?;
    let documents = documents::list(db, &path).await?;
    Ok(documents
        .into_iter()
        .filter_map(|document| match Expense::from_document(document, farm) {
            Ok(expense) => Some(expense),
            Err(err) => {
                tracing::warn!("skipping expense in {path}: {err}");
                None
            }
        })
        .collect())
}
