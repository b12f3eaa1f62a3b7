use sea_orm::TransactionTrait;

use crate::{Dashboard, Expense, Farm, ResultEngine, dashboard::aggregate};

use super::{Engine, expenses::list_expenses_in, farms::list_farms_in, with_tx};

/// Result of one fetch: the user's farms and, when a farm was selected, its
/// expenses.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fetched {
    pub farms: Vec<Farm>,
    pub selected_farm: Option<String>,
    pub expenses: Vec<Expense>,
}

impl Engine {
    /// Fetches the farm list and the expenses of the selected farm.
    ///
    /// Without a selection the expense list is empty.
    pub async fn fetch(&self, selected_farm: Option<&str>, user_id: &str) -> ResultEngine<Fetched> {
        with_tx!(self, |db_tx| {
            let farms = list_farms_in(&db_tx, user_id).await?;
            let expenses = match selected_farm {
                Some(farm_id) => {
                    let farm = self.require_farm(&db_tx, farm_id, user_id).await?;
                    list_expenses_in(&db_tx, &farm, user_id).await?
                }
                None => Vec::new(),
            };
            Ok(Fetched {
                farms,
                selected_farm: selected_farm.map(ToString::to_string),
                expenses,
            })
        })
    }

    /// Builds the dashboard of a user from one consistent snapshot.
    ///
    /// Any store failure aborts the whole computation.
    pub async fn dashboard(&self, user_id: &str) -> ResultEngine<Dashboard> {
        let per_farm = self.farms_with_expenses(user_id).await?;
        let dashboard = aggregate(per_farm)?;
        tracing::debug!(
            "dashboard for {user_id}: {} farms, total {}",
            dashboard.stats.total_farms,
            dashboard.stats.total_expenses
        );
        Ok(dashboard)
    }

    async fn farms_with_expenses(&self, user_id: &str) -> ResultEngine<Vec<(Farm, Vec<Expense>)>> {
        with_tx!(self, |db_tx| {
            let farms = list_farms_in(&db_tx, user_id).await?;
            let mut per_farm = Vec::with_capacity(farms.len());
            for farm in farms {
                let expenses = list_expenses_in(&db_tx, &farm, user_id).await?;
                per_farm.push((farm, expenses));
            }
            Ok(per_farm)
        })
    }
}
