use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

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

#[derive(Debug, Clone)]
struct StoredCertification {
    id: i64,
    draft: CertificationDraft,
}

#[derive(Debug, Clone)]
struct StoredQuestion {
    id: i64,
    exam_id: i64,
    draft: QuestionDraft,
}

#[derive(Debug, Clone)]
struct StoredResult {
    row: NewExamResult,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    users: BTreeMap<i64, User>,
    fields: BTreeMap<i64, Field>,
    courses: BTreeMap<i64, Course>,
    certifications: BTreeMap<i64, StoredCertification>,
    roadmaps: BTreeMap<i64, Roadmap>,
    majors: BTreeMap<i64, Major>,
    exams: BTreeMap<i64, Exam>,
    questions: BTreeMap<i64, StoredQuestion>,
    answers: BTreeMap<i64, ExamAnswer>,
    results: BTreeMap<i64, StoredResult>,
    evaluation_questions: BTreeMap<i64, EvaluationQuestion>,
    feedbacks: BTreeMap<i64, Feedback>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn require_field(&self, id: i64) -> RepoResult<()> {
        if self.fields.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::ForeignKey(format!("field {id} does not exist")))
        }
    }

    fn require_major(&self, id: i64) -> RepoResult<()> {
        if self.majors.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::ForeignKey(format!("major {id} does not exist")))
        }
    }

    fn require_question_majors(&self, draft: &QuestionDraft) -> RepoResult<()> {
        self.require_major(draft.first_major_id)?;
        if let Some(second) = draft.second_major_id {
            self.require_major(second)?;
        }
        Ok(())
    }

    fn certification(&self, stored: &StoredCertification) -> Certification {
        Certification {
            id: stored.id,
            name: stored.draft.name.clone(),
            platform: stored.draft.platform.clone(),
            description: stored.draft.description.clone(),
            price: stored.draft.price,
            field_id: stored.draft.field_id,
            field_name: self
                .fields
                .get(&stored.draft.field_id)
                .map(|f| f.name.clone())
                .unwrap_or_default(),
        }
    }

    fn question(&self, stored: &StoredQuestion) -> ExamQuestion {
        let major_name = |id: i64| {
            self.majors
                .get(&id)
                .map(|m| m.name.clone())
                .unwrap_or_default()
        };
        ExamQuestion {
            id: stored.id,
            question_text: stored.draft.question_text.clone(),
            exam_id: stored.exam_id,
            first_major_id: stored.draft.first_major_id,
            first_major_name: major_name(stored.draft.first_major_id),
            second_major_id: stored.draft.second_major_id,
            second_major_name: stored.draft.second_major_id.map(major_name),
            answers: self
                .answers
                .values()
                .filter(|a| a.question_id == stored.id)
                .cloned()
                .collect(),
        }
    }

    fn result(&self, id: i64, stored: &StoredResult) -> ExamResult {
        ExamResult {
            id,
            score: stored.row.score,
            user_id: stored.row.user_id,
            exam_id: stored.row.exam_id,
            major_id: stored.row.major_id,
            suggested_major_name: self
                .majors
                .get(&stored.row.major_id)
                .map(|m| m.name.clone())
                .unwrap_or_default(),
            created_at: stored.created_at,
        }
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != except)
    }

    fn evaluation_text_taken(&self, text: &str, except: Option<i64>) -> bool {
        self.evaluation_questions
            .values()
            .any(|q| q.question_text == text && Some(q.id) != except)
    }
}

fn matches_keyword(name: &str, keyword: &str) -> bool {
    name.to_lowercase().contains(&keyword.trim().to_lowercase())
}

fn ranked(mut items: Vec<PricedItem>, descending: bool) -> Vec<PricedItem> {
    items.sort_by(|a, b| {
        let by_price = a.price.total_cmp(&b.price);
        let by_price = if descending { by_price.reverse() } else { by_price };
        by_price.then(a.id.cmp(&b.id))
    });
    items.truncate(3);
    items
}

/// InMemoryRepository
///
/// A process-local `Repository` with the same observable semantics as the Postgres
/// schema: unique emails and evaluation question texts, foreign-key checks, and the
/// cascades declared in the migrations. Used by the integration tests and handy for
/// running the API without a database.
#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<MemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    // --- Accounts ---

    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut state = self.lock();
        if state.email_taken(&user.email, None) {
            return Err(RepositoryError::UniqueViolation(format!(
                "email {} already exists",
                user.email
            )));
        }
        let id = state.next_id();
        let created = User {
            id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            country: user.country,
            city: user.city,
            role: user.role,
            status: user.status,
            gender: user.gender,
            education_level: user.education_level,
            university_college: user.university_college,
            birth_date: user.birth_date,
            phone_number: user.phone_number,
            created_at: Utc::now(),
        };
        state.users.insert(id, created.clone());
        Ok(created)
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        Ok(self.lock().users.values().cloned().collect())
    }

    async fn save_user(&self, user: &User) -> RepoResult<User> {
        let mut state = self.lock();
        if state.email_taken(&user.email, Some(user.id)) {
            return Err(RepositoryError::UniqueViolation(format!(
                "email {} already exists",
                user.email
            )));
        }
        let stored = state
            .users
            .get_mut(&user.id)
            .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))?;
        let created_at = stored.created_at;
        *stored = User {
            created_at,
            ..user.clone()
        };
        Ok(stored.clone())
    }

    // --- Fields ---

    async fn create_field(&self, req: &FieldRequest) -> RepoResult<Field> {
        let mut state = self.lock();
        let id = state.next_id();
        let field = Field {
            id,
            name: req.name.clone(),
            description: req.description.clone(),
            image_url: req.image_url.clone(),
        };
        state.fields.insert(id, field.clone());
        Ok(field)
    }

    async fn get_field(&self, id: i64) -> RepoResult<Option<Field>> {
        Ok(self.lock().fields.get(&id).cloned())
    }

    async fn list_fields(&self) -> RepoResult<Vec<Field>> {
        Ok(self.lock().fields.values().cloned().collect())
    }

    async fn update_field(&self, id: i64, req: &FieldRequest) -> RepoResult<Option<Field>> {
        let mut state = self.lock();
        Ok(state.fields.get_mut(&id).map(|field| {
            field.name = req.name.clone();
            field.description = req.description.clone();
            field.image_url = req.image_url.clone();
            field.clone()
        }))
    }

    async fn delete_field(&self, id: i64) -> RepoResult<bool> {
        let mut state = self.lock();
        if state.fields.remove(&id).is_none() {
            return Ok(false);
        }
        state.courses.retain(|_, c| c.field_id != id);
        state.certifications.retain(|_, c| c.draft.field_id != id);
        state.roadmaps.retain(|_, r| r.field_id != id);
        Ok(true)
    }

    async fn search_fields(&self, keyword: &str) -> RepoResult<Vec<Field>> {
        Ok(self
            .lock()
            .fields
            .values()
            .filter(|f| matches_keyword(&f.name, keyword))
            .cloned()
            .collect())
    }

    // --- Courses ---

    async fn create_course(&self, draft: &CourseDraft) -> RepoResult<Course> {
        let mut state = self.lock();
        state.require_field(draft.field_id)?;
        let id = state.next_id();
        let course = Course {
            id,
            name: draft.name.clone(),
            platform: draft.platform.clone(),
            description: draft.description.clone(),
            price: draft.price,
            field_id: draft.field_id,
        };
        state.courses.insert(id, course.clone());
        Ok(course)
    }

    async fn get_course(&self, id: i64) -> RepoResult<Option<Course>> {
        Ok(self.lock().courses.get(&id).cloned())
    }

    async fn list_courses(&self) -> RepoResult<Vec<Course>> {
        Ok(self.lock().courses.values().cloned().collect())
    }

    async fn list_courses_by_field(&self, field_id: i64) -> RepoResult<Vec<Course>> {
        Ok(self
            .lock()
            .courses
            .values()
            .filter(|c| c.field_id == field_id)
            .cloned()
            .collect())
    }

    async fn update_course(&self, id: i64, draft: &CourseDraft) -> RepoResult<Option<Course>> {
        let mut state = self.lock();
        if !state.courses.contains_key(&id) {
            return Ok(None);
        }
        state.require_field(draft.field_id)?;
        Ok(state.courses.get_mut(&id).map(|course| {
            course.name = draft.name.clone();
            course.platform = draft.platform.clone();
            course.description = draft.description.clone();
            course.price = draft.price;
            course.field_id = draft.field_id;
            course.clone()
        }))
    }

    async fn delete_course(&self, id: i64) -> RepoResult<bool> {
        Ok(self.lock().courses.remove(&id).is_some())
    }

    // --- Certifications ---

    async fn create_certification(&self, draft: &CertificationDraft) -> RepoResult<Certification> {
        let mut state = self.lock();
        state.require_field(draft.field_id)?;
        let id = state.next_id();
        let stored = StoredCertification {
            id,
            draft: draft.clone(),
        };
        let certification = state.certification(&stored);
        state.certifications.insert(id, stored);
        Ok(certification)
    }

    async fn get_certification(&self, id: i64) -> RepoResult<Option<Certification>> {
        let state = self.lock();
        Ok(state.certifications.get(&id).map(|c| state.certification(c)))
    }

    async fn list_certifications(&self) -> RepoResult<Vec<Certification>> {
        let state = self.lock();
        Ok(state
            .certifications
            .values()
            .map(|c| state.certification(c))
            .collect())
    }

    async fn list_certifications_by_field(&self, field_id: i64) -> RepoResult<Vec<Certification>> {
        let state = self.lock();
        Ok(state
            .certifications
            .values()
            .filter(|c| c.draft.field_id == field_id)
            .map(|c| state.certification(c))
            .collect())
    }

    async fn update_certification(
        &self,
        id: i64,
        draft: &CertificationDraft,
    ) -> RepoResult<Option<Certification>> {
        let mut state = self.lock();
        if !state.certifications.contains_key(&id) {
            return Ok(None);
        }
        state.require_field(draft.field_id)?;
        let stored = StoredCertification {
            id,
            draft: draft.clone(),
        };
        let certification = state.certification(&stored);
        state.certifications.insert(id, stored);
        Ok(Some(certification))
    }

    async fn delete_certification(&self, id: i64) -> RepoResult<bool> {
        Ok(self.lock().certifications.remove(&id).is_some())
    }

    // --- Roadmaps ---

    async fn create_roadmap(&self, draft: &RoadmapDraft) -> RepoResult<Roadmap> {
        let mut state = self.lock();
        state.require_field(draft.field_id)?;
        let id = state.next_id();
        let roadmap = Roadmap {
            id,
            name: draft.name.clone(),
            roadmap_stages: draft.roadmap_stages.clone(),
            field_id: draft.field_id,
        };
        state.roadmaps.insert(id, roadmap.clone());
        Ok(roadmap)
    }

    async fn get_roadmap(&self, id: i64) -> RepoResult<Option<Roadmap>> {
        Ok(self.lock().roadmaps.get(&id).cloned())
    }

    async fn list_roadmaps(&self) -> RepoResult<Vec<Roadmap>> {
        Ok(self.lock().roadmaps.values().cloned().collect())
    }

    async fn list_roadmaps_by_field(&self, field_id: i64) -> RepoResult<Vec<Roadmap>> {
        Ok(self
            .lock()
            .roadmaps
            .values()
            .filter(|r| r.field_id == field_id)
            .cloned()
            .collect())
    }

    async fn update_roadmap(&self, id: i64, draft: &RoadmapDraft) -> RepoResult<Option<Roadmap>> {
        let mut state = self.lock();
        if !state.roadmaps.contains_key(&id) {
            return Ok(None);
        }
        state.require_field(draft.field_id)?;
        Ok(state.roadmaps.get_mut(&id).map(|roadmap| {
            roadmap.name = draft.name.clone();
            roadmap.roadmap_stages = draft.roadmap_stages.clone();
            roadmap.field_id = draft.field_id;
            roadmap.clone()
        }))
    }

    async fn delete_roadmap(&self, id: i64) -> RepoResult<bool> {
        Ok(self.lock().roadmaps.remove(&id).is_some())
    }

    // --- Majors ---

    async fn create_major(&self, req: &MajorRequest, limit: i64) -> RepoResult<Option<Major>> {
        let mut state = self.lock();
        if state.majors.len() as i64 >= limit {
            return Ok(None);
        }
        let id = state.next_id();
        let major = Major {
            id,
            name: req.name.clone(),
            description: req.description.clone(),
            image_url: req.image_url.clone(),
        };
        state.majors.insert(id, major.clone());
        Ok(Some(major))
    }

    async fn get_major(&self, id: i64) -> RepoResult<Option<Major>> {
        Ok(self.lock().majors.get(&id).cloned())
    }

    async fn list_majors(&self) -> RepoResult<Vec<Major>> {
        Ok(self.lock().majors.values().cloned().collect())
    }

    async fn update_major(&self, id: i64, req: &MajorRequest) -> RepoResult<Option<Major>> {
        let mut state = self.lock();
        Ok(state.majors.get_mut(&id).map(|major| {
            major.name = req.name.clone();
            major.description = req.description.clone();
            major.image_url = req.image_url.clone();
            major.clone()
        }))
    }

    async fn delete_major(&self, id: i64) -> RepoResult<bool> {
        let mut state = self.lock();
        let referenced = state.questions.values().any(|q| {
            q.draft.first_major_id == id || q.draft.second_major_id == Some(id)
        }) || state.results.values().any(|r| r.row.major_id == id);
        if referenced {
            return Err(RepositoryError::ForeignKey(format!(
                "major {id} is still referenced by the exam"
            )));
        }
        Ok(state.majors.remove(&id).is_some())
    }

    async fn search_majors(&self, keyword: &str) -> RepoResult<Vec<Major>> {
        Ok(self
            .lock()
            .majors
            .values()
            .filter(|m| matches_keyword(&m.name, keyword))
            .cloned()
            .collect())
    }

    // --- Exam ---

    async fn get_first_exam(&self) -> RepoResult<Option<Exam>> {
        Ok(self.lock().exams.values().next().cloned())
    }

    async fn get_exam(&self, id: i64) -> RepoResult<Option<Exam>> {
        Ok(self.lock().exams.get(&id).cloned())
    }

    async fn create_exam(&self, exam_name: &str) -> RepoResult<Exam> {
        let mut state = self.lock();
        if !state.exams.is_empty() {
            return Err(RepositoryError::UniqueViolation("an exam already exists".to_string()));
        }
        let id = state.next_id();
        let exam = Exam {
            id,
            exam_name: exam_name.to_string(),
        };
        state.exams.insert(id, exam.clone());
        Ok(exam)
    }

    async fn list_questions(&self, exam_id: i64) -> RepoResult<Vec<ExamQuestion>> {
        let state = self.lock();
        Ok(state
            .questions
            .values()
            .filter(|q| q.exam_id == exam_id)
            .map(|q| state.question(q))
            .collect())
    }

    async fn get_question(&self, id: i64) -> RepoResult<Option<ExamQuestion>> {
        let state = self.lock();
        Ok(state.questions.get(&id).map(|q| state.question(q)))
    }

    async fn create_question(
        &self,
        exam_id: i64,
        draft: &QuestionDraft,
    ) -> RepoResult<ExamQuestion> {
        let mut state = self.lock();
        if !state.exams.contains_key(&exam_id) {
            return Err(RepositoryError::ForeignKey(format!("exam {exam_id} does not exist")));
        }
        state.require_question_majors(draft)?;
        let id = state.next_id();
        let stored = StoredQuestion {
            id,
            exam_id,
            draft: draft.clone(),
        };
        let question = state.question(&stored);
        state.questions.insert(id, stored);
        Ok(question)
    }

    async fn update_question(
        &self,
        id: i64,
        draft: &QuestionDraft,
    ) -> RepoResult<Option<ExamQuestion>> {
        let mut state = self.lock();
        let Some(exam_id) = state.questions.get(&id).map(|q| q.exam_id) else {
            return Ok(None);
        };
        state.require_question_majors(draft)?;
        let stored = StoredQuestion {
            id,
            exam_id,
            draft: draft.clone(),
        };
        let question = state.question(&stored);
        state.questions.insert(id, stored);
        Ok(Some(question))
    }

    async fn delete_question(&self, id: i64) -> RepoResult<bool> {
        let mut state = self.lock();
        if state.questions.remove(&id).is_none() {
            return Ok(false);
        }
        state.answers.retain(|_, a| a.question_id != id);
        Ok(true)
    }

    async fn create_answer(&self, question_id: i64, req: &AnswerRequest) -> RepoResult<ExamAnswer> {
        let mut state = self.lock();
        if !state.questions.contains_key(&question_id) {
            return Err(RepositoryError::ForeignKey(format!(
                "question {question_id} does not exist"
            )));
        }
        let id = state.next_id();
        let answer = ExamAnswer {
            id,
            answer_text: req.answer_text.clone(),
            score: req.score,
            question_id,
        };
        state.answers.insert(id, answer.clone());
        Ok(answer)
    }

    async fn save_exam_result(&self, result: &NewExamResult) -> RepoResult<ExamResult> {
        let mut state = self.lock();
        if !state.users.contains_key(&result.user_id) || !state.exams.contains_key(&result.exam_id)
        {
            return Err(RepositoryError::ForeignKey(
                "exam result references a missing user or exam".to_string(),
            ));
        }
        state.require_major(result.major_id)?;
        let id = state.next_id();
        let stored = StoredResult {
            row: result.clone(),
            created_at: Utc::now(),
        };
        let saved = state.result(id, &stored);
        state.results.insert(id, stored);
        Ok(saved)
    }

    async fn list_results_by_user(&self, user_id: i64) -> RepoResult<Vec<ExamResult>> {
        let state = self.lock();
        Ok(state
            .results
            .iter()
            .filter(|(_, r)| r.row.user_id == user_id)
            .map(|(id, r)| state.result(*id, r))
            .collect())
    }

    // --- Evaluation questions ---

    async fn create_evaluation_question(&self, text: &str) -> RepoResult<EvaluationQuestion> {
        let mut state = self.lock();
        if state.evaluation_text_taken(text, None) {
            return Err(RepositoryError::UniqueViolation(format!(
                "evaluation question \"{text}\" already exists"
            )));
        }
        let id = state.next_id();
        let question = EvaluationQuestion {
            id,
            question_text: text.to_string(),
        };
        state.evaluation_questions.insert(id, question.clone());
        Ok(question)
    }

    async fn get_evaluation_question(&self, id: i64) -> RepoResult<Option<EvaluationQuestion>> {
        Ok(self.lock().evaluation_questions.get(&id).cloned())
    }

    async fn list_evaluation_questions(&self) -> RepoResult<Vec<EvaluationQuestion>> {
        Ok(self.lock().evaluation_questions.values().cloned().collect())
    }

    async fn update_evaluation_question(
        &self,
        id: i64,
        text: &str,
    ) -> RepoResult<Option<EvaluationQuestion>> {
        let mut state = self.lock();
        if !state.evaluation_questions.contains_key(&id) {
            return Ok(None);
        }
        if state.evaluation_text_taken(text, Some(id)) {
            return Err(RepositoryError::UniqueViolation(format!(
                "evaluation question \"{text}\" already exists"
            )));
        }
        Ok(state.evaluation_questions.get_mut(&id).map(|q| {
            q.question_text = text.to_string();
            q.clone()
        }))
    }

    async fn delete_evaluation_question(&self, id: i64) -> RepoResult<bool> {
        let mut state = self.lock();
        if state.evaluation_questions.remove(&id).is_none() {
            return Ok(false);
        }
        state.feedbacks.retain(|_, f| f.question_id != id);
        Ok(true)
    }

    // --- Feedback ---

    async fn create_feedback(&self, user_id: i64, req: &FeedbackRequest) -> RepoResult<Feedback> {
        let mut state = self.lock();
        if !state.users.contains_key(&user_id)
            || !state.evaluation_questions.contains_key(&req.question_id)
        {
            return Err(RepositoryError::ForeignKey(
                "feedback references a missing user or question".to_string(),
            ));
        }
        let id = state.next_id();
        let feedback = Feedback {
            id,
            user_id,
            question_id: req.question_id,
            feedback_choice: req.feedback_choice,
        };
        state.feedbacks.insert(id, feedback.clone());
        Ok(feedback)
    }

    async fn get_feedback(&self, id: i64) -> RepoResult<Option<Feedback>> {
        Ok(self.lock().feedbacks.get(&id).cloned())
    }

    async fn list_feedbacks(&self) -> RepoResult<Vec<Feedback>> {
        Ok(self.lock().feedbacks.values().cloned().collect())
    }

    async fn list_feedbacks_by_user(&self, user_id: i64) -> RepoResult<Vec<Feedback>> {
        Ok(self
            .lock()
            .feedbacks
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_feedback(
        &self,
        id: i64,
        req: &FeedbackRequest,
    ) -> RepoResult<Option<Feedback>> {
        let mut state = self.lock();
        if !state.feedbacks.contains_key(&id) {
            return Ok(None);
        }
        if !state.evaluation_questions.contains_key(&req.question_id) {
            return Err(RepositoryError::ForeignKey(format!(
                "evaluation question {} does not exist",
                req.question_id
            )));
        }
        Ok(state.feedbacks.get_mut(&id).map(|f| {
            f.question_id = req.question_id;
            f.feedback_choice = req.feedback_choice;
            f.clone()
        }))
    }

    async fn delete_feedback(&self, id: i64) -> RepoResult<bool> {
        Ok(self.lock().feedbacks.remove(&id).is_some())
    }

    // --- Dashboard ---

    async fn stats_snapshot(&self, since: DateTime<Utc>) -> RepoResult<StatsSnapshot> {
        let state = self.lock();

        let mut users_by_role: Vec<(Role, i64)> = Vec::new();
        let mut users_by_gender: Vec<(Option<Gender>, i64)> = Vec::new();
        for user in state.users.values() {
            match users_by_role.iter_mut().find(|(r, _)| *r == user.role) {
                Some((_, n)) => *n += 1,
                None => users_by_role.push((user.role, 1)),
            }
            match users_by_gender.iter_mut().find(|(g, _)| *g == user.gender) {
                Some((_, n)) => *n += 1,
                None => users_by_gender.push((user.gender, 1)),
            }
        }

        let courses: Vec<PricedItem> = state
            .courses
            .values()
            .map(|c| PricedItem {
                id: c.id,
                name: c.name.clone(),
                price: c.price,
            })
            .collect();
        let certifications: Vec<PricedItem> = state
            .certifications
            .values()
            .map(|c| PricedItem {
                id: c.id,
                name: c.draft.name.clone(),
                price: c.draft.price,
            })
            .collect();

        Ok(StatsSnapshot {
            total_users: state.users.len() as i64,
            users_by_role,
            users_by_gender,
            new_users_since: state
                .users
                .values()
                .filter(|u| u.created_at >= since)
                .count() as i64,
            birth_dates: state.users.values().filter_map(|u| u.birth_date).collect(),
            total_fields: state.fields.len() as i64,
            total_courses: state.courses.len() as i64,
            total_certifications: state.certifications.len() as i64,
            total_roadmaps: state.roadmaps.len() as i64,
            total_evaluations: state.feedbacks.len() as i64,
            most_expensive_courses: ranked(courses.clone(), true),
            cheapest_courses: ranked(courses, false),
            most_expensive_certifications: ranked(certifications.clone(), true),
            cheapest_certifications: ranked(certifications, false),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::UserStatus;

    fn account(email: &str) -> NewUser {
        NewUser {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            country: None,
            city: None,
            role: Role::User,
            status: UserStatus::Active,
            gender: None,
            education_level: None,
            university_college: None,
            birth_date: None,
            phone_number: None,
        }
    }

    fn major(name: &str) -> MajorRequest {
        MajorRequest {
            name: name.to_string(),
            ..MajorRequest::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_major_inserts_never_pass_the_cap() {
        let repo = Arc::new(InMemoryRepository::new());

        let handles: Vec<_> = (0..12)
            .map(|n| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.create_major(&major(&format!("Major {n}")), 6).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_some() {
                created += 1;
            }
        }

        assert_eq!(created, 6);
        assert_eq!(repo.list_majors().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn only_one_exam_can_be_stored() {
        let repo = InMemoryRepository::new();
        let first = repo.create_exam("Major Finder").await.unwrap();

        let second = repo.create_exam("Another").await;
        assert!(matches!(second, Err(RepositoryError::UniqueViolation(_))));
        assert_eq!(repo.get_first_exam().await.unwrap().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn emails_are_unique_regardless_of_case() {
        let repo = InMemoryRepository::new();
        repo.create_user(account("lina@example.com")).await.unwrap();

        let clash = repo.create_user(account("Lina@Example.COM")).await;
        assert!(matches!(clash, Err(RepositoryError::UniqueViolation(_))));
        assert_eq!(repo.list_users().await.unwrap().len(), 1);
    }
}
