use super::{PersistenceError, PersistenceResult, PlanStore};
use crate::plan::{AllocationStrategy, CapacityPlan};
use rusqlite::{Connection, Row, params};
use std::sync::{Mutex, MutexGuard};

/// Plan history in a SQLite database, one row per plan record.
pub struct SqlitePlanStore {
    connection: Mutex<Connection>,
}

impl SqlitePlanStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::from_connection(connection)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS capacity_plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                resource_id TEXT NOT NULL,
                project_id TEXT NOT NULL,
                month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
                year INTEGER NOT NULL,
                planned_capacity REAL NOT NULL,
                utilization_rate REAL NOT NULL,
                efficiency_score REAL NOT NULL,
                strategy TEXT
            );
            CREATE INDEX IF NOT EXISTS capacity_plans_period
                ON capacity_plans (year, month);
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection lock poisoned".into()))
    }

    pub fn count(&self) -> PersistenceResult<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM capacity_plans", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn select(
        &self,
        sql: &str,
        filter: Option<(u32, i32)>,
    ) -> PersistenceResult<Vec<CapacityPlan>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let raw = match filter {
            Some((month, year)) => stmt
                .query_map(params![month, year], read_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt.query_map([], read_row)?.collect::<Result<Vec<_>, _>>()?,
        };
        raw.into_iter().map(into_plan).collect()
    }
}

type RawPlanRow = (String, String, u32, i32, f64, f64, f64, Option<String>);

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawPlanRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn into_plan(raw: RawPlanRow) -> PersistenceResult<CapacityPlan> {
    let (
        resource_id,
        project_id,
        month,
        year,
        planned_capacity,
        utilization_rate,
        efficiency_score,
        strategy,
    ) = raw;
    let strategy = match strategy {
        Some(name) => Some(AllocationStrategy::from_str(&name).ok_or_else(|| {
            PersistenceError::InvalidData(format!("unknown strategy '{name}' in plan history"))
        })?),
        None => None,
    };
    Ok(CapacityPlan {
        resource_id,
        project_id,
        month,
        year,
        planned_capacity,
        utilization_rate,
        efficiency_score,
        strategy,
    })
}

const SELECT_COLUMNS: &str = "SELECT resource_id, project_id, month, year, planned_capacity, \
     utilization_rate, efficiency_score, strategy FROM capacity_plans";

impl PlanStore for SqlitePlanStore {
    fn append_plans(&self, plans: &[CapacityPlan]) -> PersistenceResult<()> {
        super::validate_plans(plans)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO capacity_plans (resource_id, project_id, month, year, \
                 planned_capacity, utilization_rate, efficiency_score, strategy) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for plan in plans {
                stmt.execute(params![
                    plan.resource_id,
                    plan.project_id,
                    plan.month,
                    plan.year,
                    plan.planned_capacity,
                    plan.utilization_rate,
                    plan.efficiency_score,
                    plan.strategy.map(|s| s.as_str()),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_plans(&self) -> PersistenceResult<Vec<CapacityPlan>> {
        self.select(&format!("{SELECT_COLUMNS} ORDER BY id ASC"), None)
    }

    fn plans_for_month(&self, month: u32, year: i32) -> PersistenceResult<Vec<CapacityPlan>> {
        self.select(
            &format!("{SELECT_COLUMNS} WHERE month = ?1 AND year = ?2 ORDER BY id ASC"),
            Some((month, year)),
        )
    }
}
