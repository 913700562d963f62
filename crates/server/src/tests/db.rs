use crate::database::connection::{DbConfig, DbConnection};
use crate::error::is_unique_violation;
use crate::models::category::CreateCategoryRequest;
use crate::models::listing::Listing;
use crate::models::resource::{CreateResourceRequest, ResourceSearch, DEFAULT_STATUS};

async fn init_and_get_db() -> DbConnection {
    let _ = tracing_subscriber::fmt::try_init();

    let db = DbConnection::connect_in_memory().await.unwrap();
    db.drop_schema().await.unwrap();
    db.init_schema().await.unwrap();
    db
}

fn resource_request(title: &str, tags: &[&str]) -> CreateResourceRequest {
    CreateResourceRequest {
        title: title.to_string(),
        description: format!("Material sobre {title}"),
        url: format!(
            "https://repotech.dev/{}",
            title.to_lowercase().replace(' ', "-")
        ),
        image: None,
        status: DEFAULT_STATUS.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
    }
}

fn search(query: Option<&str>, tag: Option<&str>, skip: i64, limit: i64) -> ResourceSearch {
    ResourceSearch {
        query: query.map(str::to_string),
        tag: tag.map(str::to_string),
        listing: Listing { skip, limit },
    }
}

#[tokio::test]
async fn create_resource_persists_record_and_tags() {
    let db = init_and_get_db().await;

    let created = db
        .create_resource(&resource_request("Guía de Rust", &["rust", "web"]))
        .await
        .unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.title, "Guía de Rust");
    assert_eq!(created.status, DEFAULT_STATUS);
    assert!(created.updated_at.is_none());
    let names: Vec<&str> = created.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["rust", "web"]);

    let fetched = db.get_resource(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.title, created.title);
    assert_eq!(fetched.url, created.url);
    assert_eq!(fetched.tags, created.tags);
    assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn duplicate_title_rolls_back_whole_create() {
    let db = init_and_get_db().await;

    db.create_resource(&resource_request("Guía de Rust", &["rust"]))
        .await
        .unwrap();
    let mut retry = resource_request("Guía de Rust", &["extra"]);
    retry.url = "https://otra.example.com".to_string();
    let err = db.create_resource(&retry).await.unwrap_err();
    assert!(is_unique_violation(&err));

    // nothing from the failed request leaked out
    let resources = db
        .list_resources(&Listing { skip: 0, limit: 10 })
        .await
        .unwrap();
    assert_eq!(resources.len(), 1);
    let tags = db.list_tags().await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "rust");
}

#[tokio::test]
async fn repeated_tag_names_link_once() {
    let db = init_and_get_db().await;

    let created = db
        .create_resource(&resource_request("Apuntes de Go", &["go", "go", "go"]))
        .await
        .unwrap();
    assert_eq!(created.tags.len(), 1);
    assert_eq!(created.tags[0].name, "go");
    assert_eq!(db.list_tags().await.unwrap().len(), 1);
}

#[tokio::test]
async fn tag_rows_are_shared_between_resources() {
    let db = init_and_get_db().await;

    let first = db
        .create_resource(&resource_request("Guía de Rust", &["rust"]))
        .await
        .unwrap();
    let second = db
        .create_resource(&resource_request("Rust para CLI", &["rust", "cli"]))
        .await
        .unwrap();

    assert_eq!(db.list_tags().await.unwrap().len(), 2);
    assert_eq!(first.tags[0].id, second.tags[0].id);
}

#[tokio::test]
async fn concurrent_creates_share_one_tag_row() {
    let _ = tracing_subscriber::fmt::try_init();

    // Two pooled connections against a real file, so the writers overlap
    // instead of serializing on a single connection.
    let path = std::env::temp_dir().join(format!("repotech_tags_{}.db", std::process::id()));
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
    let db = DbConnection::connect(&DbConfig::with_path(&path, 2))
        .await
        .unwrap();
    db.drop_schema().await.unwrap();
    db.init_schema().await.unwrap();

    let first_request = resource_request("Primer recurso", &["compartido"]);
    let second_request = resource_request("Segundo recurso", &["compartido"]);
    let (first, second) = tokio::join!(
        db.create_resource(&first_request),
        db.create_resource(&second_request),
    );
    let first = first.unwrap();
    let second = second.unwrap();

    let tags = db.list_tags().await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(first.tags[0].id, second.tags[0].id);

    drop(db);
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

#[tokio::test]
async fn create_returns_tags_in_request_order() {
    let db = init_and_get_db().await;

    db.create_resource(&resource_request("Primero", &["zeta"]))
        .await
        .unwrap();
    let created = db
        .create_resource(&resource_request("Segundo", &["alfa", "zeta"]))
        .await
        .unwrap();
    let names: Vec<&str> = created.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["alfa", "zeta"]);

    // reads come back in tag-id order instead
    let fetched = db.get_resource(created.id).await.unwrap().unwrap();
    let names: Vec<&str> = fetched.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alfa"]);
}

#[tokio::test]
async fn deleting_resource_keeps_shared_tags() {
    let db = init_and_get_db().await;

    let first = db
        .create_resource(&resource_request("Guía de Rust", &["rust"]))
        .await
        .unwrap();
    let second = db
        .create_resource(&resource_request("Rust avanzado", &["rust"]))
        .await
        .unwrap();

    assert_eq!(db.delete_resource(first.id).await.unwrap(), 1);
    assert!(db.get_resource(first.id).await.unwrap().is_none());

    let tags = db.list_tags().await.unwrap();
    assert_eq!(tags.len(), 1);
    let survivor = db.get_resource(second.id).await.unwrap().unwrap();
    assert_eq!(survivor.tags.len(), 1);
}

#[tokio::test]
async fn deleting_tag_unlinks_but_keeps_resources() {
    let db = init_and_get_db().await;

    let created = db
        .create_resource(&resource_request("Guía de Rust", &["rust", "cli"]))
        .await
        .unwrap();

    assert_eq!(db.delete_tag_by_name("cli").await.unwrap(), 1);

    let fetched = db.get_resource(created.id).await.unwrap().unwrap();
    let names: Vec<&str> = fetched.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["rust"]);
}

#[tokio::test]
async fn deletes_report_missing_rows_as_zero() {
    let db = init_and_get_db().await;

    assert_eq!(db.delete_resource(42).await.unwrap(), 0);
    assert_eq!(db.delete_resource_by_title("No existe").await.unwrap(), 0);
    assert_eq!(db.delete_tag(42).await.unwrap(), 0);
    assert_eq!(db.delete_tag_by_name("fantasma").await.unwrap(), 0);

    db.create_resource(&resource_request("Guía de Rust", &[]))
        .await
        .unwrap();
    assert_eq!(db.delete_resource_by_title("Guía de Rust").await.unwrap(), 1);
}

#[tokio::test]
async fn listing_partitions_rows_without_overlap() {
    let db = init_and_get_db().await;

    for i in 1..=25 {
        db.create_resource(&resource_request(&format!("Recurso {i:02}"), &[]))
            .await
            .unwrap();
    }

    let first = db
        .list_resources(&Listing { skip: 0, limit: 10 })
        .await
        .unwrap();
    let second = db
        .list_resources(&Listing { skip: 10, limit: 10 })
        .await
        .unwrap();
    let third = db
        .list_resources(&Listing { skip: 20, limit: 10 })
        .await
        .unwrap();

    assert_eq!(first.len(), 10);
    assert_eq!(second.len(), 10);
    assert_eq!(third.len(), 5);
    assert_eq!(first[0].title, "Recurso 01");
    assert_eq!(second[0].title, "Recurso 11");
    assert_eq!(third[4].title, "Recurso 25");

    let past_the_end = db
        .list_resources(&Listing { skip: 30, limit: 10 })
        .await
        .unwrap();
    assert!(past_the_end.is_empty());
}

#[tokio::test]
async fn search_matches_title_and_description_case_insensitively() {
    let db = init_and_get_db().await;

    db.create_resource(&resource_request("Guía de Rust", &[]))
        .await
        .unwrap();
    let mut with_match_in_description = resource_request("Axum Cookbook", &[]);
    with_match_in_description.description = "Recetas para rust en el servidor".to_string();
    db.create_resource(&with_match_in_description).await.unwrap();
    db.create_resource(&resource_request("Notas de Python", &[]))
        .await
        .unwrap();

    let found = db
        .search_resources(&search(Some("RUST"), None, 0, 10))
        .await
        .unwrap();
    assert_eq!(found.total, 2);
    let titles: Vec<&str> = found.recursos.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Guía de Rust", "Axum Cookbook"]);
}

#[tokio::test]
async fn search_composes_text_and_tag_filters() {
    let db = init_and_get_db().await;

    db.create_resource(&resource_request("Guía de Rust", &["rust"]))
        .await
        .unwrap();
    db.create_resource(&resource_request("Rust para CLI", &["cli"]))
        .await
        .unwrap();
    db.create_resource(&resource_request("Notas sueltas", &["rust"]))
        .await
        .unwrap();

    let by_tag = db
        .search_resources(&search(None, Some("rust"), 0, 10))
        .await
        .unwrap();
    assert_eq!(by_tag.total, 2);

    let both = db
        .search_resources(&search(Some("rust"), Some("rust"), 0, 10))
        .await
        .unwrap();
    assert_eq!(both.total, 1);
    assert_eq!(both.recursos[0].title, "Guía de Rust");

    let nothing = db
        .search_resources(&search(Some("python"), Some("rust"), 0, 10))
        .await
        .unwrap();
    assert_eq!(nothing.total, 0);
    assert!(nothing.recursos.is_empty());
}

#[tokio::test]
async fn search_total_counts_past_the_page() {
    let db = init_and_get_db().await;

    for i in 1..=12 {
        db.create_resource(&resource_request(&format!("Articulo {i:02} sobre rust"), &[]))
            .await
            .unwrap();
    }
    db.create_resource(&resource_request("Sin relación", &[]))
        .await
        .unwrap();

    let page = db
        .search_resources(&search(Some("rust"), None, 0, 5))
        .await
        .unwrap();
    assert_eq!(page.total, 12);
    assert_eq!(page.recursos.len(), 5);
    assert_eq!(page.skip, 0);
    assert_eq!(page.limit, 5);

    let tail = db
        .search_resources(&search(Some("rust"), None, 10, 5))
        .await
        .unwrap();
    assert_eq!(tail.total, 12);
    assert_eq!(tail.recursos.len(), 2);
}

#[tokio::test]
async fn search_treats_wildcards_as_literals() {
    let db = init_and_get_db().await;

    db.create_resource(&resource_request("100% Rust", &[]))
        .await
        .unwrap();
    db.create_resource(&resource_request("1000 Rust", &[]))
        .await
        .unwrap();
    db.create_resource(&resource_request("snake_case tips", &[]))
        .await
        .unwrap();
    db.create_resource(&resource_request("snakeXcase tips", &[]))
        .await
        .unwrap();

    let percent = db
        .search_resources(&search(Some("100%"), None, 0, 10))
        .await
        .unwrap();
    assert_eq!(percent.total, 1);
    assert_eq!(percent.recursos[0].title, "100% Rust");

    let underscore = db
        .search_resources(&search(Some("snake_case"), None, 0, 10))
        .await
        .unwrap();
    assert_eq!(underscore.total, 1);
    assert_eq!(underscore.recursos[0].title, "snake_case tips");
}

#[tokio::test]
async fn search_folds_case_for_ascii_only() {
    let db = init_and_get_db().await;

    db.create_resource(&resource_request("Guía de Rust", &[]))
        .await
        .unwrap();

    // ASCII letters fold, accented ones must match exactly
    let lowered = db
        .search_resources(&search(Some("guía"), None, 0, 10))
        .await
        .unwrap();
    assert_eq!(lowered.total, 1);

    let uppered = db
        .search_resources(&search(Some("GUÍA"), None, 0, 10))
        .await
        .unwrap();
    assert_eq!(uppered.total, 0);
}

#[tokio::test]
async fn categories_round_trip_with_dangling_parent() {
    let db = init_and_get_db().await;

    let root = db
        .create_category(&CreateCategoryRequest {
            name: "Frontend".to_string(),
            icon: "palette".to_string(),
            tags: vec!["css".to_string(), "js".to_string()],
            parent_id: None,
        })
        .await
        .unwrap();
    assert_eq!(root.id, 1);
    assert_eq!(root.tags, vec!["css", "js"]);

    // parent references are stored verbatim, existing or not
    let orphan = db
        .create_category(&CreateCategoryRequest {
            name: "Huérfana".to_string(),
            icon: "question".to_string(),
            tags: Vec::new(),
            parent_id: Some(999),
        })
        .await
        .unwrap();
    assert_eq!(orphan.parent_id, Some(999));

    let fetched = db.get_category(root.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Frontend");
    assert!(db.get_category(42).await.unwrap().is_none());

    let listed = db
        .list_categories(&Listing { skip: 0, limit: 10 })
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
}
