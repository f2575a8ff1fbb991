use axum::http::StatusCode;
use axum_test::TestServer;
use doable::api::create_router;
use doable::db::Database;
use doable::models::*;
use uuid::Uuid;

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);
    TestServer::new(app).expect("Failed to create test server")
}

async fn create_test_todo(server: &TestServer, title: &str) -> Todo {
    let response = server
        .post("/api/todos")
        .json(&CreateTodoInput {
            title: title.to_string(),
            description: None,
        })
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Todo>()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();
        let response = server.get("/api/health").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({ "status": "ok" }));
    }
}

mod create {
    use super::*;

    #[tokio::test]
    async fn returns_201_with_the_new_todo() {
        let server = setup();

        let response = server
            .post("/api/todos")
            .json(&CreateTodoInput {
                title: "Buy milk".to_string(),
                description: Some("2%".to_string()),
            })
            .await;

        response.assert_status(StatusCode::CREATED);
        let todo: Todo = response.json();
        assert_eq!(todo.title, "Buy milk");
        assert_eq!(todo.description, "2%");
        assert!(!todo.done);
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[tokio::test]
    async fn rejects_an_empty_title_with_400() {
        let server = setup();

        let response = server
            .post("/api/todos")
            .json(&CreateTodoInput {
                title: String::new(),
                description: None,
            })
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Title is required");
    }

    #[tokio::test]
    async fn rejects_a_missing_title_field_with_400() {
        let server = setup();

        let response = server
            .post("/api/todos")
            .json(&serde_json::json!({ "description": "no title field" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Title is required");
    }

    #[tokio::test]
    async fn rejects_an_unparseable_body_with_the_message_envelope() {
        let server = setup();

        let response = server
            .post("/api/todos")
            .json(&serde_json::json!({ "title": 123 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn rejects_a_whitespace_only_title_with_400() {
        let server = setup();

        let response = server
            .post("/api/todos")
            .json(&CreateTodoInput {
                title: "   ".to_string(),
                description: None,
            })
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn uses_camel_case_timestamps_on_the_wire() {
        let server = setup();

        let response = server
            .post("/api/todos")
            .json(&serde_json::json!({ "title": "Buy milk" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert!(body.get("createdAt").is_some());
        assert!(body.get("updatedAt").is_some());
        assert_eq!(body["description"], "");
    }
}

mod list {
    use super::*;

    #[tokio::test]
    async fn returns_an_empty_page_for_an_empty_store() {
        let server = setup();

        let response = server.get("/api/todos").await;
        response.assert_status_ok();

        let page: TodoPage = response.json();
        assert!(page.todos.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.pages, 1);
        assert_eq!(page.total_pending, 0);
        assert_eq!(page.total_done, 0);
    }

    #[tokio::test]
    async fn searches_title_and_description() {
        let server = setup();
        create_test_todo(&server, "Buy milk").await;
        server
            .post("/api/todos")
            .json(&CreateTodoInput {
                title: "Walk dog".to_string(),
                description: Some("milk included".to_string()),
            })
            .await;
        create_test_todo(&server, "Pay rent").await;

        let response = server.get("/api/todos").add_query_param("search", "milk").await;
        response.assert_status_ok();

        let page: TodoPage = response.json();
        assert_eq!(page.total, 2);
        let titles: Vec<_> = page.todos.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Walk dog", "Buy milk"]);
    }

    #[tokio::test]
    async fn done_filter_leaves_global_counts_alone() {
        let server = setup();
        for i in 0..3 {
            create_test_todo(&server, &format!("pending {}", i)).await;
        }
        for i in 0..2 {
            let todo = create_test_todo(&server, &format!("done {}", i)).await;
            server.patch(&format!("/api/todos/{}/done", todo.id)).await;
        }

        let response = server.get("/api/todos").add_query_param("done", true).await;
        response.assert_status_ok();

        let page: TodoPage = response.json();
        assert_eq!(page.todos.len(), 2);
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pending, 3);
        assert_eq!(page.total_done, 2);
    }

    #[tokio::test]
    async fn paginates_with_out_of_range_pages_empty() {
        let server = setup();
        for i in 0..25 {
            create_test_todo(&server, &format!("todo {:02}", i)).await;
        }

        let page1: TodoPage = server
            .get("/api/todos")
            .add_query_param("page", 1)
            .add_query_param("limit", 10)
            .await
            .json();
        assert_eq!(page1.todos.len(), 10);
        assert_eq!(page1.pages, 3);

        let page3: TodoPage = server
            .get("/api/todos")
            .add_query_param("page", 3)
            .add_query_param("limit", 10)
            .await
            .json();
        assert_eq!(page3.todos.len(), 5);

        let response = server
            .get("/api/todos")
            .add_query_param("page", 4)
            .add_query_param("limit", 10)
            .await;
        response.assert_status_ok();
        let page4: TodoPage = response.json();
        assert!(page4.todos.is_empty());
        assert_eq!(page4.total, 25);
    }

    #[tokio::test]
    async fn malformed_query_params_return_the_message_envelope() {
        let server = setup();

        let response = server.get("/api/todos").add_query_param("done", "banana").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["message"].is_string());

        let response = server.get("/api/todos").add_query_param("page", "abc").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn echoes_the_requested_page() {
        let server = setup();
        create_test_todo(&server, "only one").await;

        let page: TodoPage = server.get("/api/todos").add_query_param("page", 7).await.json();
        assert_eq!(page.page, 7);
        assert!(page.todos.is_empty());
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn replaces_text_and_refreshes_updated_at() {
        let server = setup();
        let created = create_test_todo(&server, "Buy milk").await;

        let response = server
            .put(&format!("/api/todos/{}", created.id))
            .json(&UpdateTodoInput {
                title: "Buy oat milk".to_string(),
                description: Some("barista blend".to_string()),
            })
            .await;

        response.assert_status_ok();
        let updated: Todo = response.json();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Buy oat milk");
        assert_eq!(updated.description, "barista blend");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn returns_404_for_a_missing_id() {
        let server = setup();

        let response = server
            .put(&format!("/api/todos/{}", Uuid::new_v4()))
            .json(&UpdateTodoInput {
                title: "Ghost".to_string(),
                description: None,
            })
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Todo not found");
    }

    #[tokio::test]
    async fn returns_404_for_an_id_that_is_not_a_uuid() {
        let server = setup();

        let response = server
            .put("/api/todos/missing-id")
            .json(&UpdateTodoInput {
                title: "Ghost".to_string(),
                description: None,
            })
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rejects_an_empty_title_with_400() {
        let server = setup();
        let created = create_test_todo(&server, "Buy milk").await;

        let response = server
            .put(&format!("/api/todos/{}", created.id))
            .json(&UpdateTodoInput {
                title: "  ".to_string(),
                description: None,
            })
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_a_missing_title_field_with_400() {
        let server = setup();
        let created = create_test_todo(&server, "Buy milk").await;

        let response = server
            .put(&format!("/api/todos/{}", created.id))
            .json(&serde_json::json!({ "description": "no title field" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Title is required");

        // The stored todo is untouched.
        let page: TodoPage = server.get("/api/todos").await.json();
        assert_eq!(page.todos[0].title, "Buy milk");
    }
}

mod toggle {
    use super::*;

    #[tokio::test]
    async fn flips_done_and_back() {
        let server = setup();
        let created = create_test_todo(&server, "Buy milk").await;

        let once: Todo = server
            .patch(&format!("/api/todos/{}/done", created.id))
            .await
            .json();
        assert!(once.done);
        assert!(once.updated_at > created.updated_at);

        let twice: Todo = server
            .patch(&format!("/api/todos/{}/done", created.id))
            .await
            .json();
        assert_eq!(twice.done, created.done);
        assert!(twice.updated_at > once.updated_at);
    }

    #[tokio::test]
    async fn returns_404_for_a_missing_id() {
        let server = setup();

        let response = server
            .patch(&format!("/api/todos/{}/done", Uuid::new_v4()))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server.patch("/api/todos/missing-id/done").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn returns_a_message_not_the_entity() {
        let server = setup();
        let created = create_test_todo(&server, "Buy milk").await;

        let response = server.delete(&format!("/api/todos/{}", created.id)).await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({
            "message": "Todo deleted successfully"
        }));
    }

    #[tokio::test]
    async fn makes_the_id_permanently_unknown() {
        let server = setup();
        let created = create_test_todo(&server, "Buy milk").await;

        server
            .delete(&format!("/api/todos/{}", created.id))
            .await
            .assert_status_ok();

        let response = server
            .put(&format!("/api/todos/{}", created.id))
            .json(&UpdateTodoInput {
                title: "Back".to_string(),
                description: None,
            })
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server
            .patch(&format!("/api/todos/{}/done", created.id))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server.delete(&format!("/api/todos/{}", created.id)).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn returns_404_for_a_missing_id_without_touching_others() {
        let server = setup();
        let existing = create_test_todo(&server, "Keep me").await;

        let response = server.delete(&format!("/api/todos/{}", Uuid::new_v4())).await;
        response.assert_status(StatusCode::NOT_FOUND);

        let page: TodoPage = server.get("/api/todos").await.json();
        assert_eq!(page.total, 1);
        assert_eq!(page.todos[0].id, existing.id);
    }
}
