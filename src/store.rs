use anyhow::Context;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db;
use crate::model::{
    EqLevel, EqResult, RiskFlags, RiskResult, SdqResult, Status, Student, Teacher, User,
};

// Collection keys, carried over from the web app's localStorage layout.
const STUDENTS_KEY: &str = "scs_students";
const TEACHERS_KEY: &str = "scs_teachers";
const AUTH_KEY: &str = "scs_auth_user";

/// Entities addressable by their string id.
pub trait Keyed {
    fn id(&self) -> &str;
}

impl Keyed for Student {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Keyed for Teacher {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Whole-collection store over the workspace database.
///
/// Every operation is a synchronous read-modify-write of the full collection,
/// matching the storage model being replaced. Uniqueness is not checked here;
/// that stays with the callers that need it.
pub struct Store<'a> {
    conn: &'a Connection,
}

impl<'a> Store<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // Students

    pub fn students(&self) -> anyhow::Result<Vec<Student>> {
        self.list(STUDENTS_KEY, seed_students)
    }

    pub fn add_student(&self, student: Student) -> anyhow::Result<()> {
        self.add_one(STUDENTS_KEY, seed_students, student)
    }

    pub fn bulk_add_students(&self, new_students: Vec<Student>) -> anyhow::Result<()> {
        let mut students = self.students()?;
        students.extend(new_students);
        self.save(STUDENTS_KEY, &students)
    }

    /// Replaces the student with a matching id wholesale. A miss is silently
    /// dropped; the return value only reports whether a write happened.
    pub fn update_student(&self, student: Student) -> anyhow::Result<bool> {
        self.update_one(STUDENTS_KEY, seed_students, student)
    }

    pub fn delete_student(&self, student_id: &str) -> anyhow::Result<()> {
        self.delete_one::<Student>(STUDENTS_KEY, seed_students, student_id)
    }

    // Teachers

    pub fn teachers(&self) -> anyhow::Result<Vec<Teacher>> {
        self.list(TEACHERS_KEY, seed_teachers)
    }

    pub fn add_teacher(&self, teacher: Teacher) -> anyhow::Result<()> {
        self.add_one(TEACHERS_KEY, seed_teachers, teacher)
    }

    pub fn update_teacher(&self, teacher: Teacher) -> anyhow::Result<bool> {
        self.update_one(TEACHERS_KEY, seed_teachers, teacher)
    }

    pub fn delete_teacher(&self, teacher_id: &str) -> anyhow::Result<()> {
        self.delete_one::<Teacher>(TEACHERS_KEY, seed_teachers, teacher_id)
    }

    // Session identity

    pub fn current_user(&self) -> anyhow::Result<Option<User>> {
        match db::collection_get_json(self.conn, AUTH_KEY)? {
            Some(v) => {
                let user = serde_json::from_value(v)
                    .with_context(|| format!("stored '{}' record has unexpected shape", AUTH_KEY))?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// `None` clears the stored identity (logout).
    pub fn set_current_user(&self, user: Option<&User>) -> anyhow::Result<()> {
        match user {
            Some(u) => db::collection_set_json(self.conn, AUTH_KEY, &serde_json::to_value(u)?),
            None => db::collection_remove(self.conn, AUTH_KEY),
        }
    }

    // Generic collection plumbing

    fn list<T>(&self, key: &str, seed: fn() -> Vec<T>) -> anyhow::Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        match db::collection_get_json(self.conn, key)? {
            Some(v) => serde_json::from_value(v)
                .with_context(|| format!("stored collection '{}' has unexpected shape", key)),
            None => {
                // First-ever access: persist the default dataset, then hand it
                // out. Later calls read the stored (possibly mutated) copy.
                let items = seed();
                self.save(key, &items)?;
                Ok(items)
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, items: &[T]) -> anyhow::Result<()> {
        db::collection_set_json(self.conn, key, &serde_json::to_value(items)?)
    }

    fn add_one<T>(&self, key: &str, seed: fn() -> Vec<T>, item: T) -> anyhow::Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut items = self.list(key, seed)?;
        items.push(item);
        self.save(key, &items)
    }

    fn update_one<T>(&self, key: &str, seed: fn() -> Vec<T>, item: T) -> anyhow::Result<bool>
    where
        T: Keyed + Serialize + DeserializeOwned,
    {
        let mut items = self.list(key, seed)?;
        match items.iter_mut().find(|e| e.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                self.save(key, &items)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_one<T>(&self, key: &str, seed: fn() -> Vec<T>, id: &str) -> anyhow::Result<()>
    where
        T: Keyed + Serialize + DeserializeOwned,
    {
        let mut items = self.list(key, seed)?;
        items.retain(|e| e.id() != id);
        self.save(key, &items)
    }
}

fn seed_teachers() -> Vec<Teacher> {
    vec![
        Teacher {
            id: "T001".to_string(),
            name: "คุณครูมานะ ขยันเรียน".to_string(),
            subject: "ภาษาไทย".to_string(),
        },
        Teacher {
            id: "T002".to_string(),
            name: "คุณครูชูใจ ใฝ่ดี".to_string(),
            subject: "คณิตศาสตร์".to_string(),
        },
    ]
}

// One fully-assessed sample student, verbatim from the original seed dataset.
fn seed_students() -> Vec<Student> {
    vec![Student {
        id: "S001".to_string(),
        name: "เด็กชายสมชาย มั่นคง".to_string(),
        nickname: "ชาย".to_string(),
        grade: "ป.1".to_string(),
        room: "1".to_string(),
        teacher_id: "T001".to_string(),
        sdq: Some(SdqResult {
            emotional: 2,
            conduct: 1,
            hyperactivity: 3,
            peer: 2,
            prosocial: 8,
            total_difficulties: 8,
            status: Status::Normal,
            updated_at: "2025-01-10".to_string(),
        }),
        eq: Some(EqResult {
            good: 15,
            smart: 14,
            happy: 16,
            total: 45,
            level: EqLevel::Normal,
            updated_at: "2025-01-10".to_string(),
        }),
        risk: Some(RiskResult {
            flags: RiskFlags::default(),
            status: Status::Normal,
            updated_at: "2025-01-10".to_string(),
        }),
        home_visit: None,
        counseling: None,
    }]
}
