use plaza_store::User;

use super::{lock, parse_user_id, CommandResult};
use crate::state::SharedState;

pub fn list_users(state: &SharedState) -> CommandResult<Vec<User>> {
    let guard = lock(state)?;
    Ok(guard.session.users()?)
}

/// Users other than the current one whose name or email contains `term`.
pub fn search_users(state: &SharedState, term: String) -> CommandResult<Vec<User>> {
    let guard = lock(state)?;
    Ok(guard.session.search_users(&term)?)
}

pub fn get_user(state: &SharedState, user_id: String) -> CommandResult<Option<User>> {
    let id = parse_user_id(&user_id)?;
    let guard = lock(state)?;
    Ok(guard.session.user_by_id(&id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[test]
    fn test_lookup_and_search() {
        let app = AppState::default();
        let bob = app
            .database
            .users()
            .create("Bob", "bob@x.com", 20, None)
            .unwrap();
        let state = app.into_shared();

        assert_eq!(list_users(&state).unwrap(), vec![bob.clone()]);
        assert_eq!(search_users(&state, "BO".into()).unwrap(), vec![bob.clone()]);
        assert!(search_users(&state, "zzz".into()).unwrap().is_empty());
        assert_eq!(get_user(&state, bob.id.to_string()).unwrap(), Some(bob));
        assert_eq!(get_user(&state, "nobody".into()).unwrap(), None);
    }
}
