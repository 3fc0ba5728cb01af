use crate::models::common::eq_update;
use crate::runtime::msg::{Action, ActionCtx, Event, Msg};
use crate::runtime::{Effects, Env};
use crate::types::profile::Profile;

pub fn update_profile<E: Env + 'static>(profile: &mut Profile, msg: &Msg) -> Effects {
    match msg {
        Msg::Action(Action::Ctx(ActionCtx::Authenticate(auth))) => {
            let next_profile = Profile {
                auth: Some(auth.to_owned()),
            };
            let uid = next_profile.uid();
            eq_update(profile, next_profile)
                .join(Effects::msg(Msg::Event(Event::UserAuthenticated { uid })).unchanged())
        }
        Msg::Action(Action::Ctx(ActionCtx::Logout)) => {
            let uid = profile.uid();
            eq_update(profile, Profile::default())
                .join(Effects::msg(Msg::Event(Event::UserLoggedOut { uid })).unchanged())
        }
        _ => Effects::none().unchanged(),
    }
}
