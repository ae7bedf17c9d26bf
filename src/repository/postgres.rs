use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use super::{RepoResult, Repository};
use crate::{
    error::RepositoryError,
    models::{
        AnswerRequest, Certification, CertificationDraft, Course, CourseDraft, EvaluationQuestion,
        Exam, ExamAnswer, ExamQuestion, ExamResult, Feedback, FeedbackRequest, Field, FieldRequest,
        Gender, Major, MajorRequest, NewExamResult, NewUser, PricedItem, QuestionDraft, Roadmap,
        RoadmapDraft, Role, StatsSnapshot, User,
    },
};

const USER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, country, city, role, \
     status, gender, education_level, university_college, birth_date, phone_number, created_at";

const FIELD_COLUMNS: &str = "id, name, description, image_url";
const COURSE_COLUMNS: &str = "id, name, platform, description, price, field_id";
const ROADMAP_COLUMNS: &str = "id, name, roadmap_stages, field_id";
const MAJOR_COLUMNS: &str = "id, name, description, image_url";

// Certifications are always read with the owning field's name.
const CERTIFICATION_SELECT: &str = "SELECT c.id, c.name, c.platform, c.description, c.price, \
     c.field_id, f.name AS field_name FROM certifications c JOIN fields f ON f.id = c.field_id";

// `q` is either the table itself or a CTE carrying freshly written rows.
const QUESTION_PROJECTION: &str = "SELECT q.id, q.question_text, q.exam_id, q.first_major_id, \
     fm.name AS first_major_name, q.second_major_id, sm.name AS second_major_name FROM q \
     JOIN majors fm ON fm.id = q.first_major_id LEFT JOIN majors sm ON sm.id = q.second_major_id";

const RESULT_SELECT: &str = "SELECT r.id, r.score, r.user_id, r.exam_id, r.major_id, \
     m.name AS suggested_major_name, r.created_at FROM exam_results r \
     JOIN majors m ON m.id = r.major_id";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads answer options for the given questions and attaches them in id order.
    async fn attach_answers(&self, mut questions: Vec<ExamQuestion>) -> RepoResult<Vec<ExamQuestion>> {
        if questions.is_empty() {
            return Ok(questions);
        }
        let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        let answers = sqlx::query_as::<_, ExamAnswer>(
            "SELECT id, answer_text, score, question_id FROM exam_answers \
             WHERE question_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        for answer in answers {
            if let Some(q) = questions.iter_mut().find(|q| q.id == answer.question_id) {
                q.answers.push(answer);
            }
        }
        Ok(questions)
    }

    async fn top_priced(&self, table: &str, descending: bool) -> RepoResult<Vec<PricedItem>> {
        let order = if descending { "DESC" } else { "ASC" };
        let sql = format!("SELECT id, name, price FROM {table} ORDER BY price {order}, id LIMIT 3");
        Ok(sqlx::query_as::<_, PricedItem>(&sql).fetch_all(&self.pool).await?)
    }

    async fn count(&self, table: &str) -> RepoResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        Ok(sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool).await?)
    }
}

fn like_pattern(keyword: &str) -> String {
    format!("%{}%", keyword.trim())
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- Accounts ---

    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let sql = format!(
            "INSERT INTO users (first_name, last_name, email, password_hash, country, city, role, \
             status, gender, education_level, university_college, birth_date, phone_number) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.country)
            .bind(user.city)
            .bind(user.role)
            .bind(user.status)
            .bind(user.gender)
            .bind(user.education_level)
            .bind(user.university_college)
            .bind(user.birth_date)
            .bind(user.phone_number)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn save_user(&self, user: &User) -> RepoResult<User> {
        let sql = format!(
            "UPDATE users SET first_name = $2, last_name = $3, email = $4, password_hash = $5, \
             country = $6, city = $7, role = $8, status = $9, gender = $10, education_level = $11, \
             university_college = $12, birth_date = $13, phone_number = $14 \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.country)
            .bind(&user.city)
            .bind(user.role)
            .bind(user.status)
            .bind(user.gender)
            .bind(user.education_level)
            .bind(user.university_college)
            .bind(user.birth_date)
            .bind(&user.phone_number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))
    }

    // --- Fields ---

    async fn create_field(&self, req: &FieldRequest) -> RepoResult<Field> {
        let sql = format!(
            "INSERT INTO fields (name, description, image_url) VALUES ($1, $2, $3) \
             RETURNING {FIELD_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Field>(&sql)
            .bind(&req.name)
            .bind(&req.description)
            .bind(&req.image_url)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get_field(&self, id: i64) -> RepoResult<Option<Field>> {
        let sql = format!("SELECT {FIELD_COLUMNS} FROM fields WHERE id = $1");
        Ok(sqlx::query_as::<_, Field>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_fields(&self) -> RepoResult<Vec<Field>> {
        let sql = format!("SELECT {FIELD_COLUMNS} FROM fields ORDER BY id");
        Ok(sqlx::query_as::<_, Field>(&sql).fetch_all(&self.pool).await?)
    }

    async fn update_field(&self, id: i64, req: &FieldRequest) -> RepoResult<Option<Field>> {
        let sql = format!(
            "UPDATE fields SET name = $2, description = $3, image_url = $4 WHERE id = $1 \
             RETURNING {FIELD_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Field>(&sql)
            .bind(id)
            .bind(&req.name)
            .bind(&req.description)
            .bind(&req.image_url)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_field(&self, id: i64) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await?;

        for table in ["courses", "certifications", "roadmaps"] {
            let sql = format!("DELETE FROM {table} WHERE field_id = $1");
            sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        }
        let deleted = sqlx::query("DELETE FROM fields WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn search_fields(&self, keyword: &str) -> RepoResult<Vec<Field>> {
        let sql = format!("SELECT {FIELD_COLUMNS} FROM fields WHERE name ILIKE $1 ORDER BY id");
        Ok(sqlx::query_as::<_, Field>(&sql)
            .bind(like_pattern(keyword))
            .fetch_all(&self.pool)
            .await?)
    }

    // --- Courses ---

    async fn create_course(&self, draft: &CourseDraft) -> RepoResult<Course> {
        let sql = format!(
            "INSERT INTO courses (name, platform, description, price, field_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COURSE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(&draft.name)
            .bind(&draft.platform)
            .bind(&draft.description)
            .bind(draft.price)
            .bind(draft.field_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get_course(&self, id: i64) -> RepoResult<Option<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_courses(&self) -> RepoResult<Vec<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY id");
        Ok(sqlx::query_as::<_, Course>(&sql).fetch_all(&self.pool).await?)
    }

    async fn list_courses_by_field(&self, field_id: i64) -> RepoResult<Vec<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE field_id = $1 ORDER BY id");
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(field_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_course(&self, id: i64, draft: &CourseDraft) -> RepoResult<Option<Course>> {
        let sql = format!(
            "UPDATE courses SET name = $2, platform = $3, description = $4, price = $5, \
             field_id = $6 WHERE id = $1 RETURNING {COURSE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.platform)
            .bind(&draft.description)
            .bind(draft.price)
            .bind(draft.field_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_course(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Certifications ---

    async fn create_certification(&self, draft: &CertificationDraft) -> RepoResult<Certification> {
        let sql = "WITH c AS (INSERT INTO certifications (name, platform, description, price, \
             field_id) VALUES ($1, $2, $3, $4, $5) RETURNING *) \
             SELECT c.id, c.name, c.platform, c.description, c.price, c.field_id, \
             f.name AS field_name FROM c JOIN fields f ON f.id = c.field_id";
        Ok(sqlx::query_as::<_, Certification>(sql)
            .bind(&draft.name)
            .bind(&draft.platform)
            .bind(&draft.description)
            .bind(draft.price)
            .bind(draft.field_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get_certification(&self, id: i64) -> RepoResult<Option<Certification>> {
        let sql = format!("{CERTIFICATION_SELECT} WHERE c.id = $1");
        Ok(sqlx::query_as::<_, Certification>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_certifications(&self) -> RepoResult<Vec<Certification>> {
        let sql = format!("{CERTIFICATION_SELECT} ORDER BY c.id");
        Ok(sqlx::query_as::<_, Certification>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_certifications_by_field(&self, field_id: i64) -> RepoResult<Vec<Certification>> {
        let sql = format!("{CERTIFICATION_SELECT} WHERE c.field_id = $1 ORDER BY c.id");
        Ok(sqlx::query_as::<_, Certification>(&sql)
            .bind(field_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_certification(
        &self,
        id: i64,
        draft: &CertificationDraft,
    ) -> RepoResult<Option<Certification>> {
        let sql = "WITH c AS (UPDATE certifications SET name = $2, platform = $3, \
             description = $4, price = $5, field_id = $6 WHERE id = $1 RETURNING *) \
             SELECT c.id, c.name, c.platform, c.description, c.price, c.field_id, \
             f.name AS field_name FROM c JOIN fields f ON f.id = c.field_id";
        Ok(sqlx::query_as::<_, Certification>(sql)
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.platform)
            .bind(&draft.description)
            .bind(draft.price)
            .bind(draft.field_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_certification(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM certifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Roadmaps ---

    async fn create_roadmap(&self, draft: &RoadmapDraft) -> RepoResult<Roadmap> {
        let sql = format!(
            "INSERT INTO roadmaps (name, roadmap_stages, field_id) VALUES ($1, $2, $3) \
             RETURNING {ROADMAP_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Roadmap>(&sql)
            .bind(&draft.name)
            .bind(&draft.roadmap_stages)
            .bind(draft.field_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get_roadmap(&self, id: i64) -> RepoResult<Option<Roadmap>> {
        let sql = format!("SELECT {ROADMAP_COLUMNS} FROM roadmaps WHERE id = $1");
        Ok(sqlx::query_as::<_, Roadmap>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_roadmaps(&self) -> RepoResult<Vec<Roadmap>> {
        let sql = format!("SELECT {ROADMAP_COLUMNS} FROM roadmaps ORDER BY id");
        Ok(sqlx::query_as::<_, Roadmap>(&sql).fetch_all(&self.pool).await?)
    }

    async fn list_roadmaps_by_field(&self, field_id: i64) -> RepoResult<Vec<Roadmap>> {
        let sql = format!("SELECT {ROADMAP_COLUMNS} FROM roadmaps WHERE field_id = $1 ORDER BY id");
        Ok(sqlx::query_as::<_, Roadmap>(&sql)
            .bind(field_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_roadmap(&self, id: i64, draft: &RoadmapDraft) -> RepoResult<Option<Roadmap>> {
        let sql = format!(
            "UPDATE roadmaps SET name = $2, roadmap_stages = $3, field_id = $4 WHERE id = $1 \
             RETURNING {ROADMAP_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Roadmap>(&sql)
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.roadmap_stages)
            .bind(draft.field_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_roadmap(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM roadmaps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Majors ---

    async fn create_major(&self, req: &MajorRequest, limit: i64) -> RepoResult<Option<Major>> {
        let mut tx = self.pool.begin().await?;

        // Blocks concurrent inserts until commit, so the count stays accurate.
        sqlx::query("LOCK TABLE majors IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;
        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM majors")
            .fetch_one(&mut *tx)
            .await?;
        if existing >= limit {
            return Ok(None);
        }

        let sql = format!(
            "INSERT INTO majors (name, description, image_url) VALUES ($1, $2, $3) \
             RETURNING {MAJOR_COLUMNS}"
        );
        let major = sqlx::query_as::<_, Major>(&sql)
            .bind(&req.name)
            .bind(&req.description)
            .bind(&req.image_url)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(major))
    }

    async fn get_major(&self, id: i64) -> RepoResult<Option<Major>> {
        let sql = format!("SELECT {MAJOR_COLUMNS} FROM majors WHERE id = $1");
        Ok(sqlx::query_as::<_, Major>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_majors(&self) -> RepoResult<Vec<Major>> {
        let sql = format!("SELECT {MAJOR_COLUMNS} FROM majors ORDER BY id");
        Ok(sqlx::query_as::<_, Major>(&sql).fetch_all(&self.pool).await?)
    }

    async fn update_major(&self, id: i64, req: &MajorRequest) -> RepoResult<Option<Major>> {
        let sql = format!(
            "UPDATE majors SET name = $2, description = $3, image_url = $4 WHERE id = $1 \
             RETURNING {MAJOR_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Major>(&sql)
            .bind(id)
            .bind(&req.name)
            .bind(&req.description)
            .bind(&req.image_url)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_major(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM majors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_majors(&self, keyword: &str) -> RepoResult<Vec<Major>> {
        let sql = format!("SELECT {MAJOR_COLUMNS} FROM majors WHERE name ILIKE $1 ORDER BY id");
        Ok(sqlx::query_as::<_, Major>(&sql)
            .bind(like_pattern(keyword))
            .fetch_all(&self.pool)
            .await?)
    }

    // --- Exam ---

    async fn get_first_exam(&self) -> RepoResult<Option<Exam>> {
        Ok(
            sqlx::query_as::<_, Exam>("SELECT id, exam_name FROM exams ORDER BY id LIMIT 1")
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn get_exam(&self, id: i64) -> RepoResult<Option<Exam>> {
        Ok(
            sqlx::query_as::<_, Exam>("SELECT id, exam_name FROM exams WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_exam(&self, exam_name: &str) -> RepoResult<Exam> {
        Ok(sqlx::query_as::<_, Exam>(
            "INSERT INTO exams (exam_name) VALUES ($1) RETURNING id, exam_name",
        )
        .bind(exam_name)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_questions(&self, exam_id: i64) -> RepoResult<Vec<ExamQuestion>> {
        let sql = format!(
            "WITH q AS (SELECT * FROM exam_questions WHERE exam_id = $1) \
             {QUESTION_PROJECTION} ORDER BY q.id"
        );
        let questions = sqlx::query_as::<_, ExamQuestion>(&sql)
            .bind(exam_id)
            .fetch_all(&self.pool)
            .await?;
        self.attach_answers(questions).await
    }

    async fn get_question(&self, id: i64) -> RepoResult<Option<ExamQuestion>> {
        let sql = format!("WITH q AS (SELECT * FROM exam_questions WHERE id = $1) {QUESTION_PROJECTION}");
        let question = sqlx::query_as::<_, ExamQuestion>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match question {
            Some(q) => Ok(self.attach_answers(vec![q]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create_question(
        &self,
        exam_id: i64,
        draft: &QuestionDraft,
    ) -> RepoResult<ExamQuestion> {
        let sql = format!(
            "WITH q AS (INSERT INTO exam_questions (question_text, exam_id, first_major_id, \
             second_major_id) VALUES ($1, $2, $3, $4) RETURNING *) {QUESTION_PROJECTION}"
        );
        Ok(sqlx::query_as::<_, ExamQuestion>(&sql)
            .bind(&draft.question_text)
            .bind(exam_id)
            .bind(draft.first_major_id)
            .bind(draft.second_major_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_question(
        &self,
        id: i64,
        draft: &QuestionDraft,
    ) -> RepoResult<Option<ExamQuestion>> {
        let sql = format!(
            "WITH q AS (UPDATE exam_questions SET question_text = $2, first_major_id = $3, \
             second_major_id = $4 WHERE id = $1 RETURNING *) {QUESTION_PROJECTION}"
        );
        let question = sqlx::query_as::<_, ExamQuestion>(&sql)
            .bind(id)
            .bind(&draft.question_text)
            .bind(draft.first_major_id)
            .bind(draft.second_major_id)
            .fetch_optional(&self.pool)
            .await?;
        match question {
            Some(q) => Ok(self.attach_answers(vec![q]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn delete_question(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM exam_questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_answer(&self, question_id: i64, req: &AnswerRequest) -> RepoResult<ExamAnswer> {
        Ok(sqlx::query_as::<_, ExamAnswer>(
            "INSERT INTO exam_answers (answer_text, score, question_id) VALUES ($1, $2, $3) \
             RETURNING id, answer_text, score, question_id",
        )
        .bind(&req.answer_text)
        .bind(req.score)
        .bind(question_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn save_exam_result(&self, result: &NewExamResult) -> RepoResult<ExamResult> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO exam_results (score, user_id, exam_id, major_id) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(result.score)
        .bind(result.user_id)
        .bind(result.exam_id)
        .bind(result.major_id)
        .fetch_one(&mut *tx)
        .await?;

        let sql = format!("{RESULT_SELECT} WHERE r.id = $1");
        let verified = sqlx::query_as::<_, ExamResult>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        match verified {
            Some(stored) => {
                tx.commit().await?;
                Ok(stored)
            }
            None => {
                tx.rollback().await?;
                Err(RepositoryError::Verification(
                    "Failed to verify exam result persistence".to_string(),
                ))
            }
        }
    }

    async fn list_results_by_user(&self, user_id: i64) -> RepoResult<Vec<ExamResult>> {
        let sql = format!("{RESULT_SELECT} WHERE r.user_id = $1 ORDER BY r.id");
        Ok(sqlx::query_as::<_, ExamResult>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    // --- Evaluation questions ---

    async fn create_evaluation_question(&self, text: &str) -> RepoResult<EvaluationQuestion> {
        Ok(sqlx::query_as::<_, EvaluationQuestion>(
            "INSERT INTO evaluation_questions (question_text) VALUES ($1) \
             RETURNING id, question_text",
        )
        .bind(text)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_evaluation_question(&self, id: i64) -> RepoResult<Option<EvaluationQuestion>> {
        Ok(sqlx::query_as::<_, EvaluationQuestion>(
            "SELECT id, question_text FROM evaluation_questions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_evaluation_questions(&self) -> RepoResult<Vec<EvaluationQuestion>> {
        Ok(sqlx::query_as::<_, EvaluationQuestion>(
            "SELECT id, question_text FROM evaluation_questions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_evaluation_question(
        &self,
        id: i64,
        text: &str,
    ) -> RepoResult<Option<EvaluationQuestion>> {
        Ok(sqlx::query_as::<_, EvaluationQuestion>(
            "UPDATE evaluation_questions SET question_text = $2 WHERE id = $1 \
             RETURNING id, question_text",
        )
        .bind(id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_evaluation_question(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM evaluation_questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Feedback ---

    async fn create_feedback(&self, user_id: i64, req: &FeedbackRequest) -> RepoResult<Feedback> {
        Ok(sqlx::query_as::<_, Feedback>(
            "INSERT INTO feedbacks (user_id, question_id, feedback_choice) VALUES ($1, $2, $3) \
             RETURNING id, user_id, question_id, feedback_choice",
        )
        .bind(user_id)
        .bind(req.question_id)
        .bind(req.feedback_choice)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_feedback(&self, id: i64) -> RepoResult<Option<Feedback>> {
        Ok(sqlx::query_as::<_, Feedback>(
            "SELECT id, user_id, question_id, feedback_choice FROM feedbacks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_feedbacks(&self) -> RepoResult<Vec<Feedback>> {
        Ok(sqlx::query_as::<_, Feedback>(
            "SELECT id, user_id, question_id, feedback_choice FROM feedbacks ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_feedbacks_by_user(&self, user_id: i64) -> RepoResult<Vec<Feedback>> {
        Ok(sqlx::query_as::<_, Feedback>(
            "SELECT id, user_id, question_id, feedback_choice FROM feedbacks \
             WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_feedback(
        &self,
        id: i64,
        req: &FeedbackRequest,
    ) -> RepoResult<Option<Feedback>> {
        Ok(sqlx::query_as::<_, Feedback>(
            "UPDATE feedbacks SET question_id = $2, feedback_choice = $3 WHERE id = $1 \
             RETURNING id, user_id, question_id, feedback_choice",
        )
        .bind(id)
        .bind(req.question_id)
        .bind(req.feedback_choice)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_feedback(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM feedbacks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Dashboard ---

    async fn stats_snapshot(&self, since: DateTime<Utc>) -> RepoResult<StatsSnapshot> {
        let users_by_role = sqlx::query_as::<_, (Role, i64)>(
            "SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY role",
        )
        .fetch_all(&self.pool)
        .await?;

        let users_by_gender = sqlx::query_as::<_, (Option<Gender>, i64)>(
            "SELECT gender, COUNT(*) FROM users GROUP BY gender",
        )
        .fetch_all(&self.pool)
        .await?;

        let new_users_since: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE created_at >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;

        let birth_dates: Vec<NaiveDate> =
            sqlx::query_scalar("SELECT birth_date FROM users WHERE birth_date IS NOT NULL")
                .fetch_all(&self.pool)
                .await?;

        Ok(StatsSnapshot {
            total_users: self.count("users").await?,
            users_by_role,
            users_by_gender,
            new_users_since,
            birth_dates,
            total_fields: self.count("fields").await?,
            total_courses: self.count("courses").await?,
            total_certifications: self.count("certifications").await?,
            total_roadmaps: self.count("roadmaps").await?,
            total_evaluations: self.count("feedbacks").await?,
            most_expensive_courses: self.top_priced("courses", true).await?,
            cheapest_courses: self.top_priced("courses", false).await?,
            most_expensive_certifications: self.top_priced("certifications", true).await?,
            cheapest_certifications: self.top_priced("certifications", false).await?,
        })
    }
}
