//! Plain-text rendering of nodes and jobs for the terminal.

use std::fmt::Write;

use crate::models::{ClusterInfo, Job, Node};
use crate::presentation::{JobStatusCategory, format_duration, format_timestamp};

pub fn nodes_table(nodes: &[Node]) -> String {
    if nodes.is_empty() {
        return "No nodes registered.\n".to_string();
    }

    let name_width = nodes
        .iter()
        .map(|n| n.node_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6}  {:<name_width$}  {:<11}  {}",
        "ID", "NAME", "CURRENT JOB", "CREATED"
    );
    for node in nodes {
        let current = node
            .current_job_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "idle".to_string());
        let _ = writeln!(
            out,
            "{:>6}  {:<name_width$}  {:<11}  {}",
            node.id,
            node.node_name,
            current,
            format_timestamp(Some(node.created_at))
        );
    }
    out
}

fn status_cell(status: &str) -> String {
    match JobStatusCategory::of(status) {
        JobStatusCategory::Other => format!("{} ({})", JobStatusCategory::Other.label(), status),
        category => category.label().to_string(),
    }
}

pub fn jobs_table(jobs: &[Job]) -> String {
    if jobs.is_empty() {
        return "No jobs yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6}  {:>6}  {:<18}  {:<23}  {:<23}  {:>9}  {}",
        "ID", "NODE", "STATUS", "STARTED", "FINISHED", "DURATION", "TAG"
    );
    for job in jobs {
        let _ = writeln!(
            out,
            "{:>6}  {:>6}  {:<18}  {:<23}  {:<23}  {:>9}  {}",
            job.id,
            job.node_id,
            status_cell(&job.status),
            format_timestamp(Some(job.started_at)),
            format_timestamp(job.finished_at),
            format_duration(job.duration_hours),
            job.tag.as_deref().unwrap_or("-")
        );
    }
    out
}

pub fn job_detail(job: &Job) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Job {}", job.id);
    let _ = writeln!(out, "  Cluster:   {}", job.cluster_id);
    let _ = writeln!(out, "  Node:      {}", job.node_id);
    let _ = writeln!(out, "  Status:    {}", status_cell(&job.status));
    let _ = writeln!(out, "  Started:   {}", format_timestamp(Some(job.started_at)));
    let _ = writeln!(out, "  Finished:  {}", format_timestamp(job.finished_at));
    let _ = writeln!(out, "  Duration:  {}", format_duration(job.duration_hours));
    let _ = writeln!(out, "  Tag:       {}", job.tag.as_deref().unwrap_or("-"));
    if let Some(error) = job.error_text.as_deref().filter(|e| !e.trim().is_empty()) {
        let _ = writeln!(out, "  Error:");
        for line in error.lines() {
            let _ = writeln!(out, "    {}", line);
        }
    }
    out
}

pub fn cluster_summary(info: &ClusterInfo) -> String {
    format!(
        "Cluster:   {}\nCreated:   {}\n",
        info.cluster_id,
        format_timestamp(Some(info.created_at))
    )
}
