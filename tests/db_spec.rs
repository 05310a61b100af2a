use chrono::NaiveDate;
use speculate2::speculate;
use taskmaster::db::Database;
use taskmaster::error::Error;
use taskmaster::models::*;
use taskmaster::view::Kpis;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn create_test_task(db: &Database, owner: &str, title: &str) -> Task {
    db.create_task(CreateTaskInput {
        owner: owner.to_string(),
        title: title.to_string(),
        priority: TaskPriority::Medium,
        due_date: date(2024, 6, 1),
    })
    .expect("Failed to create task")
}

speculate! {
    before {
        let db = Database::connect("sqlite::memory:").expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "connect" {
        it "rejects unsupported store schemes" {
            let result = Database::connect("mongodb://localhost:27017");
            assert!(matches!(result, Err(Error::Connection(_))));
        }

        it "opens a file-backed store and keeps tasks across handles" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let uri = format!("sqlite://{}", dir.path().join("nested/tasks.db").display());

            let first = Database::connect(&uri).expect("Failed to connect");
            first.migrate().expect("Failed to migrate");
            create_test_task(&first, "Alex", "Persisted");
            drop(first);

            let second = Database::connect(&uri).expect("Failed to reconnect");
            second.migrate().expect("Failed to migrate");
            let tasks = second.list_tasks_by_owner("Alex").expect("Query failed");
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0].title, "Persisted");
        }
    }

    describe "create_task" {
        it "creates a pending task with the given fields" {
            let task = db.create_task(CreateTaskInput {
                owner: "Alex".to_string(),
                title: "Write report".to_string(),
                priority: TaskPriority::High,
                due_date: date(2024, 6, 1),
            }).expect("Failed to create task");

            assert_eq!(task.status, TaskStatus::Pending);
            assert_eq!(task.priority, TaskPriority::High);
            assert_eq!(task.due_date, Some(date(2024, 6, 1)));
            assert_eq!(task.owner, "Alex");

            let tasks = db.list_tasks_by_owner("Alex").expect("Query failed");
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0], task);
        }

        it "rejects a blank title without touching the store" {
            let result = db.create_task(CreateTaskInput {
                owner: "Alex".to_string(),
                title: "   ".to_string(),
                priority: TaskPriority::Medium,
                due_date: date(2024, 6, 1),
            });

            assert!(matches!(result, Err(Error::Validation(_))));
            assert!(db.list_tasks_by_owner("Alex").expect("Query failed").is_empty());
        }

        it "trims owner and title" {
            let task = create_test_task(&db, "  Alex ", "  Padded  ");
            assert_eq!(task.owner, "Alex");
            assert_eq!(task.title, "Padded");
            assert_eq!(db.list_tasks_by_owner("Alex").expect("Query failed").len(), 1);
        }

        it "allows duplicate titles" {
            create_test_task(&db, "Alex", "Same");
            create_test_task(&db, "Alex", "Same");
            assert_eq!(db.list_tasks_by_owner("Alex").expect("Query failed").len(), 2);
        }
    }

    describe "list_tasks_by_owner" {
        it "returns empty list for an owner without tasks" {
            let tasks = db.list_tasks_by_owner("Nobody").expect("Query failed");
            assert!(tasks.is_empty());
        }

        it "returns only the owner's tasks" {
            create_test_task(&db, "Alex", "Mine");
            create_test_task(&db, "Sam", "Theirs");

            let tasks = db.list_tasks_by_owner("Alex").expect("Query failed");
            assert_eq!(tasks.len(), 1);
            assert!(tasks.iter().all(|t| t.owner == "Alex"));
        }

        it "orders most recently created first" {
            create_test_task(&db, "Alex", "First");
            create_test_task(&db, "Alex", "Second");
            let newest = create_test_task(&db, "Alex", "Third");

            let tasks = db.list_tasks_by_owner("Alex").expect("Query failed");
            let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
            assert_eq!(titles, vec!["Third", "Second", "First"]);
            assert_eq!(tasks[0].id, newest.id);
        }
    }

    describe "update_task" {
        it "completing a task moves it from pending to completed" {
            let task = db.create_task(CreateTaskInput {
                owner: "Alex".to_string(),
                title: "Ship".to_string(),
                priority: TaskPriority::Low,
                due_date: date(2024, 7, 4),
            }).expect("Failed to create task");
            create_test_task(&db, "Alex", "Other");

            let before = Kpis::from_tasks(&db.list_tasks_by_owner("Alex").expect("Query failed"));

            db.update_task(task.id, UpdateTaskInput {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            }).expect("Failed to update");

            let tasks = db.list_tasks_by_owner("Alex").expect("Query failed");
            let after = Kpis::from_tasks(&tasks);
            assert_eq!(after.completed, before.completed + 1);
            assert_eq!(after.pending, before.pending - 1);

            let updated = db.get_task(task.id).expect("Query failed").expect("Task missing");
            assert_eq!(updated.status, TaskStatus::Completed);
            assert_eq!(updated.priority, TaskPriority::Low);
            assert_eq!(updated.due_date, Some(date(2024, 7, 4)));
            assert_eq!(updated.owner, "Alex");
            assert_eq!(updated.created_at, task.created_at);
        }

        it "updates title and priority only when given" {
            let task = create_test_task(&db, "Alex", "Old title");

            db.update_task(task.id, UpdateTaskInput {
                title: Some("New title".to_string()),
                priority: Some(TaskPriority::High),
                status: None,
            }).expect("Failed to update");

            let updated = db.get_task(task.id).expect("Query failed").expect("Task missing");
            assert_eq!(updated.title, "New title");
            assert_eq!(updated.priority, TaskPriority::High);
            assert_eq!(updated.status, TaskStatus::Pending);
        }

        it "silently ignores unknown ids" {
            db.update_task(Uuid::new_v4(), UpdateTaskInput {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            }).expect("Update of unknown id should succeed");
        }

        it "treats an empty update as a no-op" {
            let task = create_test_task(&db, "Alex", "Unchanged");
            db.update_task(task.id, UpdateTaskInput::default()).expect("Failed to update");
            let same = db.get_task(task.id).expect("Query failed").expect("Task missing");
            assert_eq!(same, task);
        }
    }

    describe "delete_task" {
        it "removes the task and leaves other owners alone" {
            let mine = create_test_task(&db, "Alex", "Mine");
            create_test_task(&db, "Alex", "Keep");
            create_test_task(&db, "Sam", "Theirs");

            db.delete_task(mine.id).expect("Failed to delete");

            let alex = db.list_tasks_by_owner("Alex").expect("Query failed");
            assert_eq!(alex.len(), 1);
            assert!(alex.iter().all(|t| t.id != mine.id));
            assert_eq!(db.list_tasks_by_owner("Sam").expect("Query failed").len(), 1);
            assert!(db.get_task(mine.id).expect("Query failed").is_none());
        }

        it "silently ignores unknown ids" {
            db.delete_task(Uuid::new_v4()).expect("Delete of unknown id should succeed");
        }
    }
}
