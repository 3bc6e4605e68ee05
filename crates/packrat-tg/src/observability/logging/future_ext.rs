use crate::prelude::*;
use async_trait::async_trait;
use easy_ext::ext;
use futures::prelude::*;

#[ext(FutureExt)]
#[async_trait]
pub(crate) impl<T, E, F> F
where
    F: Future<Output = Result<T, E>> + Send,
{
    /// Awaits the future and logs how long it took, at a level matching
    /// the outcome.
    async fn with_duration_log<'m>(self, msg: &'m str) -> F::Output {
        let start = std::time::Instant::now();
        let result = self.await;
        let duration = tracing_duration(start.elapsed());

        match &result {
            Ok(_) => info!(duration, "{msg}: ok"),
            Err(_) => warn!(duration, "{msg}: err"),
        }

        result
    }
}
