//! Record-store-backed team repository
//!
//! Coordinates the three record sets of the team aggregate (`teams`,
//! `team_members`, `food_status`), owns id allocation and the cached team list.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::storage::{CollectionRecord, Filter, OrderBy, Record, RecordStore};
use crate::domain::team::{
    DependentRecord, DependentWriteFailure, FoodStatus, FoodStatusPatch, Meal, MealStatus,
    NewTeam, Team, TeamId, TeamIdAllocator, TeamMember, TeamPatch, TeamRepository, WriteOutcome,
};
use crate::domain::DomainError;
use crate::infrastructure::cache::ReadThroughCache;

use super::records::{FoodStatusRecord, MemberRecord, TeamRecord, POSITION_FIELD, TEAM_ID_FIELD};

/// Team repository over a generic record store
pub struct StoreTeamRepository {
    store: Arc<dyn RecordStore>,
    allocator: Arc<dyn TeamIdAllocator>,
    cache: ReadThroughCache<Vec<Team>>,
}

impl Debug for StoreTeamRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreTeamRepository")
            .field("store", &self.store)
            .field("allocator", &self.allocator)
            .finish()
    }
}

fn by_id(id: &TeamId) -> Filter {
    Filter::by("id", id.as_str())
}

fn by_team(id: &TeamId) -> Filter {
    Filter::by(TEAM_ID_FIELD, id.as_str())
}

fn degraded(record: DependentRecord, team_id: &TeamId, error: DomainError) -> DependentWriteFailure {
    warn!(
        team_id = %team_id,
        record = %record,
        error = %error,
        "Dependent write failed, team left partially written"
    );

    DependentWriteFailure {
        record,
        message: error.to_string(),
    }
}

/// Newest first; numeric id breaks ties
fn sort_newest_first(teams: &mut [Team]) {
    teams.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().number().cmp(&a.id().number()))
    });
}

impl StoreTeamRepository {
    pub fn new(store: Arc<dyn RecordStore>, allocator: Arc<dyn TeamIdAllocator>) -> Self {
        Self {
            store,
            allocator,
            cache: ReadThroughCache::new(),
        }
    }

    async fn insert_members(
        &self,
        team_id: &TeamId,
        members: &[TeamMember],
    ) -> Result<(), DomainError> {
        let records = members
            .iter()
            .enumerate()
            .map(|(position, member)| MemberRecord::new(team_id, position as u32, member).to_record())
            .collect::<Result<Vec<Record>, _>>()?;

        self.store
            .insert_many(MemberRecord::COLLECTION, records)
            .await?;

        Ok(())
    }

    async fn replace_members(
        &self,
        team_id: &TeamId,
        members: &[TeamMember],
    ) -> Result<(), DomainError> {
        self.store
            .delete(MemberRecord::COLLECTION, &by_team(team_id))
            .await?;

        if members.is_empty() {
            return Ok(());
        }

        self.insert_members(team_id, members).await
    }

    async fn insert_food_status(
        &self,
        team_id: &TeamId,
        food_status: FoodStatus,
    ) -> Result<(), DomainError> {
        let record = FoodStatusRecord::new(team_id, food_status).to_record()?;
        self.store
            .insert(FoodStatusRecord::COLLECTION, record)
            .await?;
        Ok(())
    }

    /// Update the given meals in place, or insert a record with the
    /// remaining meals `invalid` when the team has none yet
    async fn patch_food_status(
        &self,
        team_id: &TeamId,
        patch: &FoodStatusPatch,
    ) -> Result<(), DomainError> {
        let existing = self
            .store
            .find_one(FoodStatusRecord::COLLECTION, &by_team(team_id))
            .await?;

        if existing.is_none() {
            return self
                .insert_food_status(team_id, patch.apply_to(FoodStatus::default()))
                .await;
        }

        let changes: Record = patch
            .changes()
            .map(|(meal, status)| (meal.field().to_string(), Value::String(status.to_string())))
            .collect();

        self.store
            .update(FoodStatusRecord::COLLECTION, &by_team(team_id), changes)
            .await?;

        Ok(())
    }

    /// Attach members and food status to a base record; lookup errors propagate
    async fn hydrate(&self, record: Record) -> Result<Team, DomainError> {
        let team = TeamRecord::from_record(record)?.into_team();
        let filter = by_team(team.id());

        let (members, food) = tokio::try_join!(
            self.store.find_many(
                MemberRecord::COLLECTION,
                &filter,
                Some(OrderBy::asc(POSITION_FIELD)),
            ),
            self.store.find_one(FoodStatusRecord::COLLECTION, &filter),
        )?;

        let members = members
            .into_iter()
            .map(|r| MemberRecord::from_record(r).map(MemberRecord::into_member))
            .collect::<Result<Vec<_>, _>>()?;

        let food_status = match food {
            Some(r) => FoodStatusRecord::from_record(r)?.food_status(),
            None => FoodStatus::default(),
        };

        Ok(team.with_members(members).with_food_status(food_status))
    }

    /// Load and assemble every team. The second value is false when a
    /// dependent lookup failed and defaults were substituted.
    async fn load_all(&self) -> Result<(Vec<Team>, bool), DomainError> {
        let all = Filter::new();

        let (teams, members, food) = tokio::join!(
            self.store.find_many(TeamRecord::COLLECTION, &all, None),
            self.store.find_many(
                MemberRecord::COLLECTION,
                &all,
                Some(OrderBy::asc(POSITION_FIELD)),
            ),
            self.store.find_many(FoodStatusRecord::COLLECTION, &all, None),
        );

        let teams = teams?;
        let mut complete = true;

        let mut members_by_team: HashMap<String, Vec<TeamMember>> = HashMap::new();
        match members {
            Ok(records) => {
                for record in records {
                    match MemberRecord::from_record(record) {
                        Ok(member) => members_by_team
                            .entry(member.team_id.clone())
                            .or_default()
                            .push(member.into_member()),
                        Err(e) => warn!(error = %e, "Skipping malformed member record"),
                    }
                }
            }
            Err(e) => {
                complete = false;
                warn!(error = %e, "Member lookup failed, listing teams without members");
            }
        }

        let mut food_by_team: HashMap<String, FoodStatus> = HashMap::new();
        match food {
            Ok(records) => {
                for record in records {
                    match FoodStatusRecord::from_record(record) {
                        Ok(food) => {
                            food_by_team
                                .entry(food.team_id.clone())
                                .or_insert_with(|| food.food_status());
                        }
                        Err(e) => warn!(error = %e, "Skipping malformed food status record"),
                    }
                }
            }
            Err(e) => {
                complete = false;
                warn!(error = %e, "Food status lookup failed, listing default food status");
            }
        }

        let mut assembled = Vec::with_capacity(teams.len());

        for record in teams {
            let team = TeamRecord::from_record(record)?.into_team();
            let key = team.id().as_str().to_string();
            let members = members_by_team.remove(&key).unwrap_or_default();
            let food_status = food_by_team.get(&key).copied().unwrap_or_default();

            assembled.push(team.with_members(members).with_food_status(food_status));
        }

        sort_newest_first(&mut assembled);

        Ok((assembled, complete))
    }
}

#[async_trait]
impl TeamRepository for StoreTeamRepository {
    async fn get_all(&self) -> Result<Vec<Team>, DomainError> {
        if let Some(teams) = self.cache.get().await {
            debug!(count = teams.len(), "Team list served from cache");
            return Ok(teams);
        }

        let generation = self.cache.generation().await;
        let (teams, complete) = self.load_all().await?;

        // Partial results are served but not kept
        if complete && self.cache.fill(generation, teams.clone()).await {
            debug!(count = teams.len(), "Team list cached");
        }

        Ok(teams)
    }

    async fn get_one(&self, id: &TeamId) -> Result<Option<Team>, DomainError> {
        match self.store.find_one(TeamRecord::COLLECTION, &by_id(id)).await? {
            Some(record) => Ok(Some(self.hydrate(record).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, input: NewTeam) -> Result<WriteOutcome<Team>, DomainError> {
        input
            .validate()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let id = self.allocator.next_id().await;
        // Stored timestamps keep microseconds only
        let created_at = Utc::now().trunc_subsecs(6);
        let team = Team::new(id, input.name, input.leader, created_at).with_status(input.status);
        let base = TeamRecord::from_team(&team).to_record()?;

        if let Err(e) = self.store.insert(TeamRecord::COLLECTION, base).await {
            if e.is_conflict() {
                warn!(team_id = %team.id(), "Team id already taken, resyncing allocator");
                self.allocator.invalidate().await;
            }
            return Err(e);
        }

        let mut failures = Vec::new();
        let mut members = Vec::new();

        if !input.members.is_empty() {
            match self.insert_members(team.id(), &input.members).await {
                Ok(()) => members = input.members,
                Err(e) => failures.push(degraded(DependentRecord::Members, team.id(), e)),
            }
        }

        let mut food_status = FoodStatus::default();
        let requested_food = input.food_status.unwrap_or_default();

        match self.insert_food_status(team.id(), requested_food).await {
            Ok(()) => food_status = requested_food,
            Err(e) => failures.push(degraded(DependentRecord::FoodStatus, team.id(), e)),
        }

        self.cache.invalidate().await;

        info!(
            team_id = %team.id(),
            name = %team.name(),
            members = members.len(),
            consistent = failures.is_empty(),
            "Team registered"
        );

        let team = team.with_members(members).with_food_status(food_status);
        Ok(WriteOutcome::from_failures(team, failures))
    }

    async fn update(
        &self,
        id: &TeamId,
        patch: TeamPatch,
    ) -> Result<Option<WriteOutcome<Team>>, DomainError> {
        patch
            .validate()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if patch.has_base_changes() {
            let mut changes = Record::new();
            if let Some(ref name) = patch.name {
                changes.insert("name".to_string(), Value::String(name.clone()));
            }
            if let Some(ref leader) = patch.leader {
                changes.insert("leader".to_string(), Value::String(leader.clone()));
            }
            if let Some(status) = patch.status {
                changes.insert("status".to_string(), Value::String(status.to_string()));
            }

            let matched = self
                .store
                .update(TeamRecord::COLLECTION, &by_id(id), changes)
                .await?;

            if matched == 0 {
                return Ok(None);
            }
        } else if self
            .store
            .find_one(TeamRecord::COLLECTION, &by_id(id))
            .await?
            .is_none()
        {
            return Ok(None);
        }

        let mut failures = Vec::new();

        if let Some(ref members) = patch.members {
            if let Err(e) = self.replace_members(id, members).await {
                failures.push(degraded(DependentRecord::Members, id, e));
            }
        }

        if let Some(ref food_patch) = patch.food_status {
            if !food_patch.is_empty() {
                if let Err(e) = self.patch_food_status(id, food_patch).await {
                    failures.push(degraded(DependentRecord::FoodStatus, id, e));
                }
            }
        }

        self.cache.invalidate().await;

        info!(
            team_id = %id,
            consistent = failures.is_empty(),
            "Team updated"
        );

        Ok(self
            .get_one(id)
            .await?
            .map(|team| WriteOutcome::from_failures(team, failures)))
    }

    async fn delete(&self, id: &TeamId) -> Result<bool, DomainError> {
        let removed = self
            .store
            .delete(TeamRecord::COLLECTION, &by_id(id))
            .await?;

        if removed == 0 {
            return Ok(false);
        }

        // Ids are reissued after a restart, so leftovers would attach to a new team
        for (collection, record) in [
            (MemberRecord::COLLECTION, DependentRecord::Members),
            (FoodStatusRecord::COLLECTION, DependentRecord::FoodStatus),
        ] {
            if let Err(e) = self.store.delete(collection, &by_team(id)).await {
                warn!(
                    team_id = %id,
                    record = %record,
                    error = %e,
                    "Failed to clean up dependent records of deleted team"
                );
            }
        }

        self.cache.invalidate().await;

        info!(team_id = %id, "Team deleted");
        Ok(true)
    }

    async fn set_meal_status(
        &self,
        team_id: &TeamId,
        meal: Meal,
        status: MealStatus,
    ) -> Result<Option<Team>, DomainError> {
        if self
            .store
            .find_one(TeamRecord::COLLECTION, &by_id(team_id))
            .await?
            .is_none()
        {
            return Ok(None);
        }

        self.patch_food_status(team_id, &FoodStatusPatch::single(meal, status))
            .await?;

        self.cache.invalidate().await;

        info!(team_id = %team_id, meal = %meal, status = %status, "Meal status set");

        self.get_one(team_id).await
    }
}
