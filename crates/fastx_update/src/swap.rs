//! Staged binary swap: download the new binary alongside the running one,
//! write a small helper script, and spawn it detached before the caller
//! exits the current process.
//!
//! Grounded in
//! `original_source/core/update_manager.py::_update_from_exe`, translated
//! from a Windows-only batch script into a platform-branching helper.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::UpdateError;

/// Downloads `url` to a sibling of `current_exe` named `fastx-tui_new<ext>`,
/// validating the result is non-empty.
pub async fn download_to_sibling(
    client: &reqwest::Client,
    url: &str,
    current_exe: &Path,
) -> Result<PathBuf, UpdateError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(UpdateError::InvalidAsset(format!(
            "download returned status {status}"
        )));
    }
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Err(UpdateError::InvalidAsset("downloaded asset was empty".to_string()));
    }

    let ext = current_exe.extension().and_then(|e| e.to_str());
    let new_exe = sibling_named(current_exe, "fastx-tui_new", ext);
    tokio::fs::write(&new_exe, &bytes)
        .await
        .map_err(|err| UpdateError::SwapFailed(err.to_string()))?;

    let size = tokio::fs::metadata(&new_exe)
        .await
        .map_err(|err| UpdateError::SwapFailed(err.to_string()))?
        .len();
    if size == 0 {
        return Err(UpdateError::InvalidAsset("staged binary is empty".to_string()));
    }

    Ok(new_exe)
}

/// Writes a helper script that replaces `current_exe` with `new_exe` and
/// restarts the application, then spawns it detached. The caller must exit
/// the current process immediately afterward so the helper's delete step
/// can succeed.
pub async fn stage_and_launch_helper(
    current_exe: &Path,
    new_exe: &Path,
) -> Result<(), UpdateError> {
    let dir = current_exe
        .parent()
        .ok_or_else(|| UpdateError::SwapFailed("executable has no parent directory".to_string()))?;

    if cfg!(windows) {
        let script_path = dir.join("fastx-tui_update.bat");
        let content = windows_helper_script(current_exe, new_exe, &script_path);
        tokio::fs::write(&script_path, content)
            .await
            .map_err(|err| UpdateError::SwapFailed(err.to_string()))?;

        Command::new("cmd.exe")
            .args(["/c", &script_path.display().to_string()])
            .current_dir(dir)
            .spawn()
            .map_err(|err| UpdateError::SwapFailed(err.to_string()))?;
    } else {
        let script_path = dir.join("fastx-tui_update.sh");
        let content = unix_helper_script(current_exe, new_exe, &script_path);
        tokio::fs::write(&script_path, content)
            .await
            .map_err(|err| UpdateError::SwapFailed(err.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = tokio::fs::metadata(&script_path)
                .await
                .map_err(|err| UpdateError::SwapFailed(err.to_string()))?
                .permissions();
            perms.set_mode(0o755);
            tokio::fs::set_permissions(&script_path, perms)
                .await
                .map_err(|err| UpdateError::SwapFailed(err.to_string()))?;
        }

        Command::new("/bin/sh")
            .arg(&script_path)
            .current_dir(dir)
            .spawn()
            .map_err(|err| UpdateError::SwapFailed(err.to_string()))?;
    }

    Ok(())
}

fn sibling_named(current_exe: &Path, stem: &str, ext: Option<&str>) -> PathBuf {
    let dir = current_exe.parent().unwrap_or_else(|| Path::new("."));
    match ext {
        Some(ext) => dir.join(format!("{stem}.{ext}")),
        None => dir.join(stem),
    }
}

fn windows_helper_script(current_exe: &Path, new_exe: &Path, script_path: &Path) -> String {
    format!(
        r#"@echo off
timeout /t 2 /nobreak >nul
if exist "{current}" del "{current}"
rename "{new}" "{current_name}"
if exist "{script}" del "{script}"
start "" "{current}"
"#,
        current = current_exe.display(),
        new = new_exe.display(),
        current_name = current_exe.file_name().and_then(|n| n.to_str()).unwrap_or("fastx-tui.exe"),
        script = script_path.display(),
    )
}

fn unix_helper_script(current_exe: &Path, new_exe: &Path, script_path: &Path) -> String {
    format!(
        r#"#!/bin/sh
sleep 2
rm -f "{current}"
mv "{new}" "{current}"
chmod +x "{current}"
"{current}" &
rm -f "{script}"
"#,
        current = current_exe.display(),
        new = new_exe.display(),
        script = script_path.display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_script_replaces_and_restarts() {
        let script = unix_helper_script(
            Path::new("/opt/fastx-tui"),
            Path::new("/opt/fastx-tui_new"),
            Path::new("/opt/fastx-tui_update.sh"),
        );
        assert!(script.contains("mv \"/opt/fastx-tui_new\" \"/opt/fastx-tui\""));
        assert!(script.contains("rm -f \"/opt/fastx-tui_update.sh\""));
    }

    #[test]
    fn sibling_path_preserves_extension() {
        let sibling = sibling_named(Path::new("/opt/fastx-tui.exe"), "fastx-tui_new", Some("exe"));
        assert_eq!(sibling, Path::new("/opt/fastx-tui_new.exe"));
    }
}
