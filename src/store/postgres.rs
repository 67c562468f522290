use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::model::{Id, Node, NodeClass, NodeGroup, ParamOwner, Parameter};
use crate::store::traits::{ClassStore, GroupStore, NodeStore, ParameterStore, Store};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL.
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn node_from_row(row: &sqlx::postgres::PgRow) -> Node {
    Node {
        id: row.get("id"),
        name: row.get("name"),
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

fn group_from_row(row: &sqlx::postgres::PgRow) -> NodeGroup {
    NodeGroup {
        id: row.get("id"),
        name: row.get("name"),
    }
}

fn class_from_row(row: &sqlx::postgres::PgRow) -> NodeClass {
    NodeClass {
        id: row.get("id"),
        name: row.get("name"),
    }
}

#[async_trait::async_trait]
impl NodeStore for PostgresStore {
    async fn get_node(&self, id: Id) -> Result<Option<Node>> {
        let row = sqlx::query("SELECT id, name, status, created_at FROM nodes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch node")?;

        Ok(row.as_ref().map(node_from_row))
    }

    async fn get_node_by_name(&self, name: &str) -> Result<Option<Node>> {
        let row = sqlx::query("SELECT id, name, status, created_at FROM nodes WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch node by name")?;

        Ok(row.as_ref().map(node_from_row))
    }

    async fn list_nodes(&self, status: Option<&str>) -> Result<Vec<Node>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT id, name, status, created_at FROM nodes WHERE status = $1 \
                     ORDER BY UPPER(name)",
                )
                .bind(status)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query("SELECT id, name, status, created_at FROM nodes ORDER BY UPPER(name)")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .context("Failed to list nodes")?;

        Ok(rows.iter().map(node_from_row).collect())
    }

    async fn create_node(&self, name: &str) -> Result<Node> {
        let row = sqlx::query(
            "INSERT INTO nodes (name, created_at) VALUES ($1, NOW()) \
             RETURNING id, name, status, created_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create node")?;

        Ok(node_from_row(&row))
    }

    async fn delete_node(&self, id: Id) -> Result<bool> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM node_class_memberships WHERE node_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete node class memberships")?;
        sqlx::query("DELETE FROM node_group_memberships WHERE node_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete node group memberships")?;
        sqlx::query("DELETE FROM parameters WHERE parameterable_type = 'Node' AND parameterable_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete node parameters")?;
        let result = sqlx::query("DELETE FROM nodes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete node")?;

        tx.commit().await.context("Failed to commit node deletion")?;

        Ok(result.rows_affected() > 0)
    }

    async fn groups_of_node(&self, node_id: Id) -> Result<Vec<NodeGroup>> {
        let rows = sqlx::query(
            "SELECT ng.id, ng.name FROM node_group_memberships ngm \
             JOIN node_groups ng ON ng.id = ngm.node_group_id \
             WHERE ngm.node_id = $1 ORDER BY ngm.id",
        )
        .bind(node_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch groups of node")?;

        Ok(rows.iter().map(group_from_row).collect())
    }

    async fn classes_of_node(&self, node_id: Id) -> Result<Vec<NodeClass>> {
        let rows = sqlx::query(
            "SELECT nc.id, nc.name FROM node_class_memberships ncm \
             JOIN node_classes nc ON nc.id = ncm.node_class_id \
             WHERE ncm.node_id = $1 ORDER BY ncm.id",
        )
        .bind(node_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch classes of node")?;

        Ok(rows.iter().map(class_from_row).collect())
    }

    async fn add_node_to_group(&self, node_id: Id, group_id: Id) -> Result<()> {
        sqlx::query("INSERT INTO node_group_memberships (node_id, node_group_id) VALUES ($1, $2)")
            .bind(node_id)
            .bind(group_id)
            .execute(&self.pool)
            .await
            .context("Failed to add node to group")?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl GroupStore for PostgresStore {
    async fn get_group(&self, id: Id) -> Result<Option<NodeGroup>> {
        let row = sqlx::query("SELECT id, name FROM node_groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch node group")?;

        Ok(row.as_ref().map(group_from_row))
    }

    async fn get_group_by_name(&self, name: &str) -> Result<Option<NodeGroup>> {
        let row = sqlx::query("SELECT id, name FROM node_groups WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch node group by name")?;

        Ok(row.as_ref().map(group_from_row))
    }

    async fn list_groups(&self) -> Result<Vec<NodeGroup>> {
        let rows = sqlx::query("SELECT id, name FROM node_groups ORDER BY UPPER(name)")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list node groups")?;

        Ok(rows.iter().map(group_from_row).collect())
    }

    async fn create_group(&self, name: &str) -> Result<NodeGroup> {
        let row = sqlx::query("INSERT INTO node_groups (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .context("Failed to create node group")?;

        Ok(group_from_row(&row))
    }

    async fn add_group_edge(&self, child_id: Id, parent_id: Id) -> Result<()> {
        sqlx::query("INSERT INTO node_group_edges (from_id, to_id) VALUES ($1, $2)")
            .bind(child_id)
            .bind(parent_id)
            .execute(&self.pool)
            .await
            .context("Failed to add group edge")?;

        Ok(())
    }

    async fn parents_of_group(&self, group_id: Id) -> Result<Vec<NodeGroup>> {
        let rows = sqlx::query(
            "SELECT ng.id, ng.name FROM node_group_edges nge \
             JOIN node_groups ng ON ng.id = nge.to_id \
             WHERE nge.from_id = $1 ORDER BY nge.id",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch parents of group")?;

        Ok(rows.iter().map(group_from_row).collect())
    }

    async fn children_of_group(&self, group_id: Id) -> Result<Vec<NodeGroup>> {
        let rows = sqlx::query(
            "SELECT ng.id, ng.name FROM node_group_edges nge \
             JOIN node_groups ng ON ng.id = nge.from_id \
             WHERE nge.to_id = $1 ORDER BY nge.id",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch children of group")?;

        Ok(rows.iter().map(group_from_row).collect())
    }

    async fn members_of_group(&self, group_id: Id) -> Result<Vec<Node>> {
        let rows = sqlx::query(
            "SELECT n.id, n.name, n.status, n.created_at FROM node_group_memberships ngm \
             JOIN nodes n ON n.id = ngm.node_id \
             WHERE ngm.node_group_id = $1 ORDER BY ngm.id",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch members of group")?;

        Ok(rows.iter().map(node_from_row).collect())
    }

    async fn classes_of_group(&self, group_id: Id) -> Result<Vec<NodeClass>> {
        let rows = sqlx::query(
            "SELECT nc.id, nc.name FROM node_group_class_memberships ngcm \
             JOIN node_classes nc ON nc.id = ngcm.node_class_id \
             WHERE ngcm.node_group_id = $1 ORDER BY ngcm.id",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch classes of group")?;

        Ok(rows.iter().map(class_from_row).collect())
    }

    async fn assign_class_to_group(&self, group_id: Id, class_id: Id) -> Result<()> {
        sqlx::query(
            "INSERT INTO node_group_class_memberships (node_group_id, node_class_id) VALUES ($1, $2)",
        )
        .bind(group_id)
        .bind(class_id)
        .execute(&self.pool)
        .await
        .context("Failed to assign class to group")?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ClassStore for PostgresStore {
    async fn get_class(&self, id: Id) -> Result<Option<NodeClass>> {
        let row = sqlx::query("SELECT id, name FROM node_classes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch node class")?;

        Ok(row.as_ref().map(class_from_row))
    }

    async fn get_class_by_name(&self, name: &str) -> Result<Option<NodeClass>> {
        let row = sqlx::query("SELECT id, name FROM node_classes WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch node class by name")?;

        Ok(row.as_ref().map(class_from_row))
    }

    async fn list_classes(&self) -> Result<Vec<NodeClass>> {
        let rows = sqlx::query("SELECT id, name FROM node_classes ORDER BY UPPER(name)")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list node classes")?;

        Ok(rows.iter().map(class_from_row).collect())
    }

    async fn create_class(&self, name: &str) -> Result<NodeClass> {
        let row = sqlx::query("INSERT INTO node_classes (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .context("Failed to create node class")?;

        Ok(class_from_row(&row))
    }

    async fn groups_with_class(&self, class_id: Id) -> Result<Vec<NodeGroup>> {
        let rows = sqlx::query(
            "SELECT ng.id, ng.name FROM node_group_class_memberships ngcm \
             JOIN node_groups ng ON ng.id = ngcm.node_group_id \
             WHERE ngcm.node_class_id = $1 ORDER BY ngcm.id",
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch groups with class")?;

        Ok(rows.iter().map(group_from_row).collect())
    }

    async fn nodes_with_class(&self, class_id: Id) -> Result<Vec<Node>> {
        let rows = sqlx::query(
            "SELECT n.id, n.name, n.status, n.created_at FROM node_class_memberships ncm \
             JOIN nodes n ON n.id = ncm.node_id \
             WHERE ncm.node_class_id = $1 ORDER BY ncm.id",
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch nodes with class")?;

        Ok(rows.iter().map(node_from_row).collect())
    }

    async fn assign_class_to_node(&self, node_id: Id, class_id: Id) -> Result<()> {
        sqlx::query("INSERT INTO node_class_memberships (node_id, node_class_id) VALUES ($1, $2)")
            .bind(node_id)
            .bind(class_id)
            .execute(&self.pool)
            .await
            .context("Failed to assign class to node")?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl ParameterStore for PostgresStore {
    async fn parameters_of(&self, owner: ParamOwner, owner_id: Id) -> Result<Vec<Parameter>> {
        let rows = sqlx::query(
            "SELECT key, value FROM parameters \
             WHERE parameterable_type = $1 AND parameterable_id = $2 \
             ORDER BY UPPER(key)",
        )
        .bind(owner.db_type())
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch parameters")?;

        Ok(rows
            .iter()
            .map(|row| Parameter {
                key: row.get("key"),
                value: row.get("value"),
            })
            .collect())
    }

    async fn set_parameter(
        &self,
        owner: ParamOwner,
        owner_id: Id,
        key: &str,
        value: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO parameters (parameterable_type, parameterable_id, key, value) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (parameterable_type, parameterable_id, key) \
             DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(owner.db_type())
        .bind(owner_id)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .context("Failed to set parameter")?;

        Ok(())
    }
}

impl Store for PostgresStore {}
