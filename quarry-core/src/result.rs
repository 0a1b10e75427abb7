//! Result sets and row decoding

use crate::{Error, Result, Value};
use futures::stream::{self, Stream};
use serde::de::DeserializeOwned;
use std::fmt;

/// One row of a result set, cells in title order
pub type Row = Vec<Value>;

/// Pulls rows one at a time from a driver's result
pub trait ResultFetcher: Send {
    /// Next row, or `None` once the result is exhausted
    fn fetch_next(&mut self) -> Option<Row>;

    /// Column titles, in cell order
    fn fetch_titles(&self) -> Vec<String>;
}

/// A forward-only set of rows backed by a [`ResultFetcher`]
pub struct ResultSet {
    fetcher: Box<dyn ResultFetcher>,
    titles: Vec<String>,
}

impl ResultSet {
    pub fn new<F>(fetcher: F) -> Self
    where
        F: ResultFetcher + 'static,
    {
        let titles = fetcher.fetch_titles();
        Self {
            fetcher: Box::new(fetcher),
            titles,
        }
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn next_row(&mut self) -> Option<Row> {
        self.fetcher.fetch_next()
    }

    /// Decode the next row into `T`, keying cells by column title
    pub fn decode_next<T>(&mut self) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.next_row() {
            Some(row) => decode_row(&self.titles, row).map(Some),
            None => Ok(None),
        }
    }

    /// Decode every remaining row
    pub fn decode_all<T>(mut self) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::new();
        while let Some(item) = self.decode_next()? {
            items.push(item);
        }
        Ok(items)
    }

    /// Remaining rows as a stream; the fetcher is polled lazily
    pub fn into_stream(self) -> impl Stream<Item = Row> + Send {
        stream::unfold(self, |mut set| async move {
            let row = set.next_row()?;
            Some((row, set))
        })
    }
}

impl Iterator for ResultSet {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.next_row()
    }
}

impl fmt::Debug for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("titles", &self.titles)
            .finish_non_exhaustive()
    }
}

/// Build a JSON object from titles and cells, then deserialize it
pub fn decode_row<T>(titles: &[String], row: Row) -> Result<T>
where
    T: DeserializeOwned,
{
    if row.len() != titles.len() {
        return Err(Error::RowShape {
            expected: titles.len(),
            actual: row.len(),
        });
    }

    let object: serde_json::Map<String, serde_json::Value> = titles
        .iter()
        .cloned()
        .zip(row.iter().map(Value::to_json))
        .collect();
    Ok(serde_json::from_value(serde_json::Value::Object(object))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde::Deserialize;

    struct Pairs {
        rows: std::vec::IntoIter<Row>,
    }

    impl ResultFetcher for Pairs {
        fn fetch_next(&mut self) -> Option<Row> {
            self.rows.next()
        }

        fn fetch_titles(&self) -> Vec<String> {
            vec!["key".to_string(), "count".to_string()]
        }
    }

    fn pairs(rows: Vec<Row>) -> ResultSet {
        ResultSet::new(Pairs {
            rows: rows.into_iter(),
        })
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Pair {
        key: String,
        count: i64,
    }

    #[test]
    fn test_decode_all() {
        let set = pairs(vec![
            vec![Value::from("a"), Value::I64(1)],
            vec![Value::from("b"), Value::I32(2)],
        ]);
        assert_eq!(set.titles(), ["key", "count"]);

        let decoded: Vec<Pair> = set.decode_all().unwrap();
        assert_eq!(
            decoded,
            vec![
                Pair { key: "a".into(), count: 1 },
                Pair { key: "b".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn test_row_shape_mismatch() {
        let mut set = pairs(vec![vec![Value::from("a")]]);
        let err = set.decode_next::<Pair>().unwrap_err();
        assert!(matches!(err, Error::RowShape { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_type_mismatch_is_serialization_error() {
        let mut set = pairs(vec![vec![Value::I32(1), Value::I32(2)]]);
        let err = set.decode_next::<Pair>().unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_iterator_is_not_restartable() {
        let mut set = pairs(vec![vec![Value::from("a"), Value::I64(1)]]);
        assert_eq!(set.by_ref().count(), 1);
        assert!(set.next().is_none());
    }

    #[tokio::test]
    async fn test_stream_yields_remaining_rows() {
        let mut set = pairs(vec![
            vec![Value::from("a"), Value::I64(1)],
            vec![Value::from("b"), Value::I64(2)],
        ]);
        set.next_row();

        let rows: Vec<Row> = set.into_stream().collect().await;
        assert_eq!(rows, vec![vec![Value::from("b"), Value::I64(2)]]);
    }
}
