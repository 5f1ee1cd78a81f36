//! Environment overrides for the LLM service
//!
//! Kept in its own test binary: it mutates process environment variables.

use finroute_core::Config;
use tempfile::TempDir;

#[test]
fn test_env_overrides_survive_llm_service_section() {
    std::env::set_var("FINROUTE_LLM_API_KEY", "sk-from-env");
    std::env::set_var("FINROUTE_EMBEDDING_URL", "http://embeddings.local:8080");
    std::env::set_var("FINROUTE_EMBEDDING_DIMS", "384");

    let temp = TempDir::new().unwrap();

    let with_section = temp.path().join("with_section.yml");
    std::fs::write(&with_section, "llm_service:\n  model: gpt-4o-mini\n").unwrap();
    let config = Config::load_from(&with_section).unwrap();
    assert_eq!(config.llm_service.api_key.as_deref(), Some("sk-from-env"));
    assert_eq!(config.llm_service.embeddings_url(), "http://embeddings.local:8080");
    assert_eq!(config.llm_service.embedding_dimensions, Some(384));
    assert_eq!(config.llm_service.model, "gpt-4o-mini");

    let without_section = temp.path().join("without_section.yml");
    std::fs::write(&without_section, "iteration_budget: 5\n").unwrap();
    let config = Config::load_from(&without_section).unwrap();
    assert_eq!(config.llm_service.api_key.as_deref(), Some("sk-from-env"));
    assert_eq!(config.llm_service.embedding_dimensions, Some(384));

    let explicit = temp.path().join("explicit.yml");
    std::fs::write(&explicit, "llm_service:\n  api_key: sk-from-file\n").unwrap();
    let config = Config::load_from(&explicit).unwrap();
    assert_eq!(config.llm_service.api_key.as_deref(), Some("sk-from-file"));

    std::env::remove_var("FINROUTE_LLM_API_KEY");
    std::env::remove_var("FINROUTE_EMBEDDING_URL");
    std::env::remove_var("FINROUTE_EMBEDDING_DIMS");
}
