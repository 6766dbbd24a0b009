use anyhow::Context;
use tracing::{debug, info, instrument};

use crate::cli::Command;
use crate::client::TaskApi;
use crate::render::Renderer;
use crate::sync::SyncController;

/// Runs one CLI intent against a freshly loaded list. Every command starts
/// with a full fetch so ids refer to what the server holds right now.
#[instrument(skip(controller, renderer))]
pub async fn dispatch<A: TaskApi>(
    controller: &mut SyncController<A>,
    renderer: &Renderer,
    command: Command,
) -> anyhow::Result<()> {
    controller
        .fetch_all()
        .await
        .context("failed to fetch tasks")?;
    debug!(count = controller.store().len(), "initial list loaded");

    match command {
        Command::List => {}
        Command::Add { title, description } => {
            let draft = controller.draft_mut();
            draft.title = title;
            draft.description = description;
            let notice = controller.create().await.context("failed to create task")?;
            println!("{notice}");
        }
        Command::Edit {
            id,
            title,
            description,
        } => {
            controller.begin_edit(&id)?;
            let draft = controller.draft_mut();
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(description) = description {
                draft.description = description;
            }
            let notice = controller
                .update()
                .await
                .with_context(|| format!("failed to update task {id}"))?;
            println!("{notice}");
        }
        Command::Toggle { id } => {
            let notice = controller
                .toggle(&id)
                .await
                .with_context(|| format!("failed to toggle task {id}"))?;
            println!("{notice}");
        }
        Command::Delete { id } => {
            let notice = controller
                .remove(&id)
                .await
                .with_context(|| format!("failed to delete task {id}"))?;
            println!("{notice}");
        }
        Command::Show { id } => {
            controller
                .refresh(&id)
                .await
                .with_context(|| format!("failed to read task {id}"))?;
            if let Some(task) = controller.store().get(&id) {
                renderer.print_task_info(task)?;
            }
            return Ok(());
        }
    }

    renderer.print_task_table(controller.store().tasks())?;
    info!(count = controller.store().len(), "command finished");
    Ok(())
}
