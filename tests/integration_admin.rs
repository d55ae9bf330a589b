mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{PASSWORD, TestApp};
use kurs::middleware::auth::USER_NOT_FOUND_MESSAGE;
use kurs::middleware::role::ADMIN_ONLY_MESSAGE;
use kurs::modules::admin::service::{INVALID_ROLE_MESSAGE, INVALID_USER_ID_MESSAGE};
use kurs::store::{CourseStore, UserStore};

#[tokio::test]
async fn test_admin_routes_reject_students() {
    let app = TestApp::new();
    let (_, student) = app.create_student().await;

    for uri in ["/admin/users", "/admin/analytics"] {
        let response = app.get(uri, Some(&student)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(response.message(), ADMIN_ONLY_MESSAGE);
    }

    let response = app.get("/admin/users", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_users_hides_credentials() {
    let app = TestApp::new();
    let (_, admin) = app.create_admin().await;
    app.create_student().await;

    let response = app.get("/admin/users", Some(&admin)).await;

    assert_eq!(response.status, StatusCode::OK);
    let users = response.body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("password").is_none());
        assert!(user.get("resetPasswordToken").is_none());
    }
}

#[tokio::test]
async fn test_promote_student_to_admin() {
    let app = TestApp::new();
    let (_, admin) = app.create_admin().await;
    let (email, student) = app.create_student().await;
    let id = app.user_by_email(&email).await.id;

    let response = app
        .put_json(
            &format!("/admin/users/{}/role", id),
            json!({ "role": "admin" }),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["role"], "admin");

    // Authorization reads the stored role, so the old session is promoted too.
    let response = app.get("/admin/analytics", Some(&student)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_role_validation() {
    let app = TestApp::new();
    let (admin_record, admin) = app.create_admin().await;

    let response = app
        .put_json(
            &format!("/admin/users/{}/role", admin_record.id),
            json!({ "role": "mentor" }),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), INVALID_ROLE_MESSAGE);

    let response = app
        .put_json(
            "/admin/users/42/role",
            json!({ "role": "admin" }),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), INVALID_USER_ID_MESSAGE);

    let response = app
        .put_json(
            &format!("/admin/users/{}/role", Uuid::new_v4()),
            json!({ "role": "admin" }),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), USER_NOT_FOUND_MESSAGE);
}

#[tokio::test]
async fn test_delete_user_pulls_enrollments() {
    let app = TestApp::new();
    let (_, admin) = app.create_admin().await;
    let category_id = app.create_category(&admin, "Dasturlash").await;
    let course_id = app.create_course(&admin, "Rust asoslari", &category_id).await;
    app.approve_course(&admin, &course_id).await;

    let (email, student) = app.create_student().await;
    let student_id = app.user_by_email(&email).await.id;
    let enroll = app
        .post_json(&format!("/kurs/{}/enroll", course_id), json!({}), Some(&student))
        .await;
    assert_eq!(enroll.status, StatusCode::OK);

    let response = app
        .delete(&format!("/admin/users/{}", student_id), Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let course_id = Uuid::parse_str(&course_id).unwrap();
    let course = CourseStore::find_by_id(app.store.as_ref(), course_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!course.students.contains(&student_id));
    assert!(
        UserStore::find_by_id(app.store.as_ref(), student_id)
            .await
            .unwrap()
            .is_none()
    );

    assert_eq!(
        app.login(&email, PASSWORD).await.status,
        StatusCode::NOT_FOUND
    );
    let response = app.get("/user/profile", Some(&student)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .delete(&format!("/admin/users/{}", student_id), Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_approve_course_returns_populated_course() {
    let app = TestApp::new();
    let (_, admin) = app.create_admin().await;
    let category_id = app.create_category(&admin, "Dasturlash").await;
    let course_id = app.create_course(&admin, "Rust asoslari", &category_id).await;

    let response = app
        .request(
            "PUT",
            &format!("/admin/kurs/{}/approve", course_id),
            None,
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "active");
    assert_eq!(response.body["data"]["category"]["name"], "Dasturlash");

    let response = app
        .request(
            "PUT",
            &format!("/admin/kurs/{}/approve", Uuid::new_v4()),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_analytics_ranks_top_five() {
    let app = TestApp::new();
    let (_, admin) = app.create_admin().await;
    app.create_student().await;
    let category_id = app.create_category(&admin, "Dasturlash").await;

    let enrollments = [1usize, 4, 0, 2, 6, 3];
    for (i, count) in enrollments.iter().enumerate() {
        let course_id = app
            .create_course(&admin, &format!("Kurs {}", i), &category_id)
            .await;
        let course_id = Uuid::parse_str(&course_id).unwrap();
        for _ in 0..*count {
            CourseStore::enroll(app.store.as_ref(), course_id, Uuid::new_v4())
                .await
                .unwrap();
        }
    }

    let response = app.get("/admin/analytics", Some(&admin)).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["totalUsers"], 2);
    assert_eq!(data["totalKurslar"], 6);

    let popular = data["popularKurslar"].as_array().unwrap();
    let ranked: Vec<(&str, i64)> = popular
        .iter()
        .map(|c| (c["title"].as_str().unwrap(), c["studentCount"].as_i64().unwrap()))
        .collect();
    assert_eq!(
        ranked,
        vec![
            ("Kurs 4", 6),
            ("Kurs 1", 4),
            ("Kurs 5", 3),
            ("Kurs 3", 2),
            ("Kurs 0", 1),
        ]
    );
}
