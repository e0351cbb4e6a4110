use crate::{
    create_task_request::CreateTaskRequest,
    data_access::data_context::{DataContext, DataContextError},
    list_tasks_query::ListTasksQuery,
    service_error::ServiceError,
    services::suggestion_generator::SuggestionGenerator,
    suggestion::Suggestion,
    task::{Task, TaskWithSuggestions},
    update_task_request::UpdateTaskRequest,
};

/// The task lifecycle: validation, persistence and suggestion generation.
#[derive(Clone)]
pub struct TaskService {
    data_context: DataContext,
    generator: SuggestionGenerator,
    max_page_size: usize,
}

impl TaskService {
    pub fn new(data_context: DataContext, generator: SuggestionGenerator, max_page_size: usize) -> Self {
        Self {
            data_context,
            generator,
            max_page_size,
        }
    }

    pub async fn create_task(&self, request: CreateTaskRequest) -> Result<Task, ServiceError> {
        let new_task = request.into_new_task()?;
        let task = self
            .with_store(move |store| store.create_task(new_task))
            .await?;
        tracing::info!(task_id = task.id, "task created");
        Ok(task)
    }

    pub async fn get_task(&self, id: u64) -> Result<TaskWithSuggestions, ServiceError> {
        self.with_store(move |store| store.get_task(id))
            .await?
            .ok_or_else(|| ServiceError::task_not_found(id))
    }

    /// `limit` is clamped to the configured page size.
    pub async fn list_tasks(
        &self,
        query: ListTasksQuery,
    ) -> Result<Vec<TaskWithSuggestions>, ServiceError> {
        let offset = query.offset;
        let limit = query.limit.min(self.max_page_size);
        self.with_store(move |store| store.list_tasks(offset, limit))
            .await
    }

    pub async fn update_task(
        &self,
        id: u64,
        request: UpdateTaskRequest,
    ) -> Result<TaskWithSuggestions, ServiceError> {
        let update = request.into_update()?;
        let updated = self
            .with_store(move |store| store.update_task(id, update))
            .await?
            .ok_or_else(|| ServiceError::task_not_found(id))?;
        tracing::info!(task_id = id, status = %updated.task.status, "task updated");
        Ok(updated)
    }

    pub async fn delete_task(&self, id: u64) -> Result<(), ServiceError> {
        if !self.with_store(move |store| store.delete_task(id)).await? {
            return Err(ServiceError::task_not_found(id));
        }
        tracing::info!(task_id = id, "task deleted");
        Ok(())
    }

    /// Ask the completion service about a task and keep the answer.
    ///
    /// A missing task fails before any outbound call. If the task disappears
    /// while the call is in flight the answer is dropped.
    pub async fn generate_suggestion(&self, task_id: u64) -> Result<Suggestion, ServiceError> {
        let task = self.get_task(task_id).await?.task;

        let content = self.generator.generate(&task).await?;

        let suggestion = self
            .with_store(move |store| store.create_suggestion(task_id, content))
            .await?
            .ok_or_else(|| ServiceError::task_not_found(task_id))?;
        tracing::info!(task_id, suggestion_id = suggestion.id, "suggestion stored");
        Ok(suggestion)
    }

    /// redb transactions block (a writer waits for the previous commit), so
    /// they run on the blocking pool instead of a runtime worker.
    async fn with_store<T, F>(&self, operation: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&DataContext) -> Result<T, DataContextError> + Send + 'static,
        T: Send + 'static,
    {
        let data_context = self.data_context.clone();
        tokio::task::spawn_blocking(move || operation(&data_context))
            .await
            .map_err(|e| ServiceError::Internal(format!("store task failed: {e}")))?
            .map_err(ServiceError::from)
    }
}
