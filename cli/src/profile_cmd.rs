//! `profile show` and `profile upload`.

use std::path::Path;

use taskpad_core::profile::PictureFile;

use crate::context::{AppContext, NOT_SIGNED_IN};
use crate::render;

pub(crate) async fn cmd_show(ctx: &AppContext, json: bool) -> Result<(), String> {
    let profile = ensure_profile(ctx).await?;
    if json {
        println!("{}", render::to_json(&profile));
    } else {
        println!("{}", render::profile(&profile));
    }
    Ok(())
}

pub(crate) async fn cmd_upload(ctx: &AppContext, path: &Path) -> Result<(), String> {
    let file = PictureFile::read(path)
        .await
        .map_err(|e| format!("{}: {e}", path.display()))?;
    let current = ensure_profile(ctx).await?;
    let updated = ctx
        .services
        .profiles
        .upload_picture(&current, file)
        .await
        .map_err(|e| e.to_string())?;
    println!("{}", render::profile(&updated));
    Ok(())
}

async fn ensure_profile(ctx: &AppContext) -> Result<taskpad_core::Profile, String> {
    ctx.services.profiles.ensure().await.map_err(|e| match e {
        taskpad_core::TaskpadError::NotAuthenticated => NOT_SIGNED_IN.to_string(),
        other => other.to_string(),
    })
}
