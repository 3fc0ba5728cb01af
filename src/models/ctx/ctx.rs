use derivative::Derivative;
use serde::{Deserialize, Serialize};

use crate::models::ctx::{update_profile, update_search_history};
use crate::runtime::msg::Msg;
use crate::runtime::{Effect, Effects, Env, Model};
use crate::types::profile::{Profile, UID};
use crate::types::search_history::SearchHistoryBucket;

/// Identifies a single search history load.
///
/// Results of a load are applied only while [`Ctx`] still waits for the same request.
#[derive(Clone, PartialEq, Eq, Serialize, Debug)]
pub struct SearchHistoryLoadRequest {
    pub uid: UID,
    pub generation: u64,
    /// Whether local entries found by this load are pushed to API.
    pub migrate_local: bool,
}

#[derive(Clone, PartialEq, Eq, Serialize, Debug)]
pub enum SearchHistoryStatus {
    Loading(SearchHistoryLoadRequest),
    /// Local entries are being pushed to API, a reload follows.
    Migrating(SearchHistoryLoadRequest),
    Ready,
}

#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum CtxField {
    Profile,
    SearchHistory,
}

#[derive(Derivative, Serialize, Clone, Debug)]
#[derivative(Default)]
#[serde(rename_all = "camelCase")]
pub struct Ctx {
    pub profile: Profile,
    pub search_history: SearchHistoryBucket,
    #[serde(skip)]
    #[derivative(Default(value = "SearchHistoryStatus::Ready"))]
    pub search_history_status: SearchHistoryStatus,
    #[serde(skip)]
    pub search_history_generation: u64,
}

impl Ctx {
    pub fn new(profile: Profile, search_history: SearchHistoryBucket) -> Self {
        Self {
            profile,
            search_history,
            ..Self::default()
        }
    }
    fn update_search_history<E: Env + 'static>(&mut self, msg: &Msg) -> Effects {
        update_search_history::<E>(
            &mut self.search_history,
            &mut self.search_history_status,
            &mut self.search_history_generation,
            &self.profile,
            msg,
        )
    }
}

impl<E: Env + 'static> Model<E> for Ctx {
    type Field = CtxField;

    fn update(&mut self, msg: &Msg) -> (Vec<Effect>, Vec<Self::Field>) {
        let profile_effects = update_profile::<E>(&mut self.profile, msg);
        let search_history_effects = self.update_search_history::<E>(msg);
        let fields = [
            (CtxField::Profile, profile_effects.has_changed),
            (CtxField::SearchHistory, search_history_effects.has_changed),
        ]
        .into_iter()
        .filter(|(_, has_changed)| *has_changed)
        .map(|(field, _)| field)
        .collect::<Vec<_>>();
        let effects = profile_effects
            .join(search_history_effects)
            .into_iter()
            .collect::<Vec<_>>();
        (effects, fields)
    }
    fn update_field(&mut self, msg: &Msg, field: &Self::Field) -> (Vec<Effect>, Vec<Self::Field>) {
        let effects = match field {
            CtxField::Profile => update_profile::<E>(&mut self.profile, msg),
            CtxField::SearchHistory => self.update_search_history::<E>(msg),
        };
        let fields = if effects.has_changed {
            vec![field.to_owned()]
        } else {
            vec![]
        };
        (effects.into_iter().collect(), fields)
    }
}
