pub mod audit;
pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod packet;
pub mod prompts;
pub mod risk;
pub mod run;
pub mod schemas;
pub mod utils;

/// Load environment variables before configuration is read. Picks up `.env`
/// from the working directory, or the file named by `PACKREVIEW_ENV_FILE`
/// when set. Missing files are fine; variables already set stay as they are.
pub fn load_env() {
    load_env_file(std::env::var("PACKREVIEW_ENV_FILE").ok().as_deref());
}

fn load_env_file(override_path: Option<&str>) {
    match override_path {
        Some(path) if !path.trim().is_empty() => {
            let _ = dotenvy::from_path(path);
        }
        _ => {
            let _ = dotenvy::dotenv();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_file_override_is_loaded() {
        let marker = format!(
            "PACKREVIEW_ENV_MARKER_{}",
            utils::generate_run_id().replace('-', "")
        );
        let path = std::env::temp_dir().join(format!("{}.env", marker.to_lowercase()));
        std::fs::write(&path, format!("{}=from-override\n", marker)).unwrap();

        load_env_file(path.to_str());

        assert_eq!(std::env::var(&marker).unwrap(), "from-override");
        std::fs::remove_file(&path).ok();
    }
}
