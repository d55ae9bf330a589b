//! In-memory store used by the HTTP tests.
//!
//! Mirrors the Postgres semantics that the handlers rely on: unique keys,
//! partial updates, compare-and-clear reset-code redemption and set-like
//! enrollment lists.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use kurs_core::AppError;
use kurs_models::categories::{Category, CategoryChanges, CategorySummary, NewCategory};
use kurs_models::courses::{
    Course, CourseChanges, CourseDetails, CourseStatus, NewCourse, PopularCourse,
};
use kurs_models::users::{NewUser, UserChanges, UserRecord, UserSummary};

use super::{
    CategoryStore, CourseStore, DUPLICATE_CATEGORY_MESSAGE, DUPLICATE_COURSE_MESSAGE,
    DUPLICATE_USER_MESSAGE, UserStore,
};

#[derive(Default)]
struct Collections {
    users: Vec<UserRecord>,
    categories: Vec<Category>,
    courses: Vec<Course>,
}

impl Collections {
    fn populate(&self, course: &Course) -> CourseDetails {
        let category = course.category_id.and_then(|id| {
            self.categories
                .iter()
                .find(|c| c.id == id)
                .map(CategorySummary::from)
        });
        let students: Vec<UserSummary> = self.users.iter().map(UserSummary::from).collect();
        CourseDetails::populate(course.clone(), category, &students)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AppError> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<UserRecord>, AppError> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.inner.read().await.users.len() as i64)
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let mut data = self.inner.write().await;
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::conflict(DUPLICATE_USER_MESSAGE));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            user_name: user.user_name,
            email: user.email,
            password_hash: user.password_hash,
            tel: user.tel,
            image: user.image,
            role: user.role,
            reset_password_token: None,
            reset_password_expire: None,
            created_at: now,
            updated_at: now,
        };
        data.users.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<UserRecord>, AppError> {
        let mut data = self.inner.write().await;
        let Some(user) = data.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };

        if let Some(user_name) = changes.user_name {
            user.user_name = user_name;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(image) = changes.image {
            user.image = Some(image);
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn set_reset_code(
        &self,
        id: Uuid,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut data = self.inner.write().await;
        if let Some(user) = data.users.iter_mut().find(|u| u.id == id) {
            user.reset_password_token = Some(code.to_string());
            user.reset_password_expire = Some(expires_at);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn redeem_reset_code(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let mut data = self.inner.write().await;
        let Some(user) = data.users.iter_mut().find(|u| {
            u.email == email
                && u.reset_password_token.as_deref() == Some(code)
                && u.reset_password_expire.is_some_and(|exp| exp > now)
        }) else {
            return Ok(None);
        };

        user.password_hash = password_hash.to_string();
        user.reset_password_token = None;
        user.reset_password_expire = None;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut data = self.inner.write().await;
        let before = data.users.len();
        data.users.retain(|u| u.id != id);
        Ok(data.users.len() != before)
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.inner.read().await.categories.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let data = self.inner.read().await;
        Ok(data.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, AppError> {
        let data = self.inner.read().await;
        Ok(data.categories.iter().find(|c| c.name == name).cloned())
    }

    async fn insert(&self, category: NewCategory) -> Result<Category, AppError> {
        let mut data = self.inner.write().await;
        if data.categories.iter().any(|c| c.name == category.name) {
            return Err(AppError::conflict(DUPLICATE_CATEGORY_MESSAGE));
        }

        let now = Utc::now();
        let record = Category {
            id: Uuid::new_v4(),
            name: category.name,
            description: category.description,
            created_at: now,
            updated_at: now,
        };
        data.categories.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: CategoryChanges,
    ) -> Result<Option<Category>, AppError> {
        let mut data = self.inner.write().await;
        if let Some(name) = &changes.name {
            if data.categories.iter().any(|c| c.id != id && &c.name == name) {
                return Err(AppError::conflict(DUPLICATE_CATEGORY_MESSAGE));
            }
        }

        let Some(category) = data.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            category.name = name;
        }
        if let Some(description) = changes.description {
            category.description = Some(description);
        }
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut data = self.inner.write().await;
        let before = data.categories.len();
        data.categories.retain(|c| c.id != id);
        let removed = data.categories.len() != before;

        if removed {
            for course in data.courses.iter_mut().filter(|c| c.category_id == Some(id)) {
                course.category_id = None;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn list_populated(&self) -> Result<Vec<CourseDetails>, AppError> {
        let data = self.inner.read().await;
        Ok(data.courses.iter().map(|c| data.populate(c)).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, AppError> {
        let data = self.inner.read().await;
        Ok(data.courses.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Course>, AppError> {
        let data = self.inner.read().await;
        Ok(data.courses.iter().find(|c| c.title == title).cloned())
    }

    async fn insert(&self, course: NewCourse) -> Result<Course, AppError> {
        let mut data = self.inner.write().await;
        if data.courses.iter().any(|c| c.title == course.title) {
            return Err(AppError::conflict(DUPLICATE_COURSE_MESSAGE));
        }

        let now = Utc::now();
        let record = Course {
            id: Uuid::new_v4(),
            title: course.title,
            description: course.description,
            duration: course.duration,
            price: course.price,
            status: CourseStatus::Pending,
            category_id: course.category_id,
            students: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        data.courses.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, changes: CourseChanges) -> Result<Option<Course>, AppError> {
        let mut data = self.inner.write().await;
        if let Some(title) = &changes.title {
            if data.courses.iter().any(|c| c.id != id && &c.title == title) {
                return Err(AppError::conflict(DUPLICATE_COURSE_MESSAGE));
            }
        }

        let Some(course) = data.courses.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            course.title = title;
        }
        if let Some(description) = changes.description {
            course.description = description;
        }
        if let Some(duration) = changes.duration {
            course.duration = duration;
        }
        if let Some(price) = changes.price {
            course.price = price;
        }
        if let Some(category_id) = changes.category_id {
            course.category_id = Some(category_id);
        }
        course.updated_at = Utc::now();
        Ok(Some(course.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut data = self.inner.write().await;
        let before = data.courses.len();
        data.courses.retain(|c| c.id != id);
        Ok(data.courses.len() != before)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: CourseStatus,
    ) -> Result<Option<CourseDetails>, AppError> {
        let mut data = self.inner.write().await;
        let Some(course) = data.courses.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        course.status = status;
        course.updated_at = Utc::now();
        let course = course.clone();
        Ok(Some(data.populate(&course)))
    }

    async fn enroll(&self, id: Uuid, user_id: Uuid) -> Result<Option<Course>, AppError> {
        let mut data = self.inner.write().await;
        if !data.users.iter().any(|u| u.id == user_id) {
            return Ok(None);
        }
        let Some(course) = data.courses.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if !course.students.contains(&user_id) {
            course.students.push(user_id);
        }
        course.updated_at = Utc::now();
        Ok(Some(course.clone()))
    }

    async fn remove_student(&self, user_id: Uuid) -> Result<u64, AppError> {
        let mut data = self.inner.write().await;
        let mut changed = 0;
        for course in data.courses.iter_mut() {
            if course.students.contains(&user_id) {
                course.students.retain(|id| *id != user_id);
                course.updated_at = Utc::now();
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.inner.read().await.courses.len() as i64)
    }

    async fn most_popular(&self, limit: i64) -> Result<Vec<PopularCourse>, AppError> {
        let data = self.inner.read().await;
        let mut ranked: Vec<PopularCourse> = data
            .courses
            .iter()
            .map(|c| PopularCourse {
                id: c.id,
                title: c.title.clone(),
                student_count: c.students.len() as i64,
            })
            .collect();
        // Stable sort keeps insertion (creation) order among ties.
        ranked.sort_by(|a, b| b.student_count.cmp(&a.student_count));
        ranked.truncate(limit.max(0) as usize);
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurs_models::users::UserRole;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            user_name: "Ali".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            tel: 998901234567,
            image: None,
            role: UserRole::Student,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        UserStore::insert(&store, new_user("ali@example.com"))
            .await
            .unwrap();
        let err = UserStore::insert(&store, new_user("ali@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_redeem_requires_matching_unexpired_code() {
        let store = MemoryStore::new();
        let user = UserStore::insert(&store, new_user("ali@example.com"))
            .await
            .unwrap();
        let now = Utc::now();
        store
            .set_reset_code(user.id, "123456", now + chrono::Duration::seconds(180))
            .await
            .unwrap();

        assert!(
            store
                .redeem_reset_code("ali@example.com", "654321", now, "new")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .redeem_reset_code(
                    "ali@example.com",
                    "123456",
                    now + chrono::Duration::seconds(180),
                    "new"
                )
                .await
                .unwrap()
                .is_none()
        );

        let redeemed = store
            .redeem_reset_code("ali@example.com", "123456", now, "new")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(redeemed.password_hash, "new");
        assert!(redeemed.reset_password_token.is_none());
        assert!(redeemed.reset_password_expire.is_none());

        // Single use.
        assert!(
            store
                .redeem_reset_code("ali@example.com", "123456", now, "again")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_enroll_is_idempotent_and_remove_student_pulls_everywhere() {
        let store = MemoryStore::new();
        let user_id = UserStore::insert(&store, new_user("ali@example.com"))
            .await
            .unwrap()
            .id;
        let mut course_ids = Vec::new();
        for title in ["Rust", "Go"] {
            let course = CourseStore::insert(
                &store,
                NewCourse {
                    title: title.to_string(),
                    description: "d".to_string(),
                    duration: 1,
                    price: 1.0,
                    category_id: None,
                },
            )
            .await
            .unwrap();
            course_ids.push(course.id);
        }

        store.enroll(course_ids[0], user_id).await.unwrap();
        let course = store.enroll(course_ids[0], user_id).await.unwrap().unwrap();
        assert_eq!(course.students, vec![user_id]);
        store.enroll(course_ids[1], user_id).await.unwrap();

        assert_eq!(store.remove_student(user_id).await.unwrap(), 2);
        for id in course_ids {
            let course = CourseStore::find_by_id(&store, id).await.unwrap().unwrap();
            assert!(course.students.is_empty());
        }
    }

    #[tokio::test]
    async fn test_most_popular_orders_by_enrollment() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for title in ["A", "B", "C"] {
            let course = CourseStore::insert(
                &store,
                NewCourse {
                    title: title.to_string(),
                    description: "d".to_string(),
                    duration: 1,
                    price: 1.0,
                    category_id: None,
                },
            )
            .await
            .unwrap();
            ids.push(course.id);
        }
        let mut students = Vec::new();
        for email in ["a@example.com", "b@example.com"] {
            students.push(UserStore::insert(&store, new_user(email)).await.unwrap().id);
        }
        store.enroll(ids[1], students[0]).await.unwrap();
        store.enroll(ids[1], students[1]).await.unwrap();
        store.enroll(ids[2], students[0]).await.unwrap();

        let ranked = store.most_popular(2).await.unwrap();
        let titles: Vec<_> = ranked.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C"]);
        assert_eq!(ranked[0].student_count, 2);
    }

    #[tokio::test]
    async fn test_enroll_rejects_deleted_user() {
        let store = MemoryStore::new();
        let user = UserStore::insert(&store, new_user("ali@example.com"))
            .await
            .unwrap();
        let course = CourseStore::insert(
            &store,
            NewCourse {
                title: "Rust".to_string(),
                description: "d".to_string(),
                duration: 1,
                price: 1.0,
                category_id: None,
            },
        )
        .await
        .unwrap();

        assert!(UserStore::delete(&store, user.id).await.unwrap());
        assert!(store.enroll(course.id, user.id).await.unwrap().is_none());

        let course = CourseStore::find_by_id(&store, course.id)
            .await
            .unwrap()
            .unwrap();
        assert!(course.students.is_empty());
    }
}
