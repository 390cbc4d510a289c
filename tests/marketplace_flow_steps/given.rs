//! Given steps for marketplace flow BDD scenarios.

use super::world::MarketplaceWorld;
use eyre::WrapErr;
use rstest_bdd_macros::given;
use serde_json::json;

#[given(r#"a signed-in "{role}" user "{uid}""#)]
fn signed_in_user(world: &mut MarketplaceWorld, role: String, uid: String) -> Result<(), eyre::Report> {
    world.call_as(&uid, "signIn", json!({ "role": role }))?;
    let response = world
        .last_result
        .take()
        .ok_or_else(|| eyre::eyre!("missing sign-in result"))?
        .map_err(|err| eyre::eyre!("{err}"))
        .wrap_err_with(|| format!("sign in {uid} as {role}"))?;
    world.sign_in_responses.push(response);
    Ok(())
}
