//! Chunked conversion of many documents.

use std::slice::Chunks;

use crate::metadata::ConversionResult;
use crate::service::MailmarkService;
use crate::Result;

/// Lazy batch conversion, one chunk per item.
///
/// Only the documents of the chunk being converted are parsed at any time.
pub struct Batch<'s, 'i, S> {
    service: &'s MailmarkService,
    chunks: Chunks<'i, S>,
}

impl<S: AsRef<str>> Iterator for Batch<'_, '_, S> {
    type Item = Result<Vec<ConversionResult>>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.chunks.next()?;
        Some(
            chunk
                .iter()
                .map(|html| self.service.convert(html.as_ref()))
                .collect(),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl MailmarkService {
    /// Iterate over conversion results in chunks of `batch_size` documents
    pub fn batch<'s, 'i, S: AsRef<str>>(&'s self, inputs: &'i [S]) -> Batch<'s, 'i, S> {
        Batch {
            service: self,
            chunks: inputs.chunks(self.options().batch_size.max(1)),
        }
    }

    /// Convert every document, yielding the thread between chunks.
    ///
    /// The first failing document fails the whole batch.
    pub fn convert_batch<S: AsRef<str>>(&self, inputs: &[S]) -> Result<Vec<ConversionResult>> {
        let mut results = Vec::with_capacity(inputs.len());
        for (index, chunk) in self.batch(inputs).enumerate() {
            if index > 0 {
                std::thread::yield_now();
            }
            results.extend(chunk?);
        }
        tracing::debug!(documents = results.len(), "converted batch");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use mailmark_core::ConversionOptions;

    use super::*;
    use crate::MailmarkError;

    fn service(batch_size: usize) -> MailmarkService {
        MailmarkService::with_options(ConversionOptions {
            batch_size,
            ..Default::default()
        })
    }

    #[test]
    fn test_chunks_follow_batch_size() {
        let inputs: Vec<String> = (0..5).map(|i| format!("<p>{i}</p>")).collect();
        let service = service(2);
        let sizes: Vec<usize> = service
            .batch(&inputs)
            .map(|chunk| chunk.unwrap().len())
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_convert_batch_keeps_order() {
        let results = service(2)
            .convert_batch(&["<p>a</p>", "<p>b</p>", "<p>c</p>"])
            .unwrap();
        let markdown: Vec<&str> = results.iter().map(|r| r.markdown.as_str()).collect();
        assert_eq!(markdown, vec!["a\n", "b\n", "c\n"]);
    }

    #[test]
    fn test_empty_batch() {
        let inputs: [&str; 0] = [];
        assert!(MailmarkService::new().convert_batch(&inputs).unwrap().is_empty());
    }

    #[test]
    fn test_zero_batch_size_still_progresses() {
        let results = service(0).convert_batch(&["<p>a</p>"]).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_failure_fails_batch() {
        let err = service(1).convert_batch(&["<p>a</p>", ""]).unwrap_err();
        assert!(matches!(err, MailmarkError::InvalidInput(_)));
    }
}
