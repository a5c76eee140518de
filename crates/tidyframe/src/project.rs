use crate::error::{FrameError, FrameResult};
use crate::table::Table;
use log::{debug, info};
use tidyframe_columnar::{Column, Value};

impl Table {
    /// Keep `columns` in the given order. Every kept column shares storage with `self`.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> FrameResult<Table> {
        let pairs: Vec<(&str, &str)> = columns
            .iter()
            .map(|name| (name.as_ref(), name.as_ref()))
            .collect();
        self.select_as(&pairs)
    }

    /// Keep `(source, label)` pairs in the given order, relabeling as requested.
    ///
    /// Grouping columns that are not selected are added back in front so the grouping stays
    /// valid; renamed grouping columns carry their new label into the grouping keys.
    pub fn select_as<S, T>(&self, columns: &[(S, T)]) -> FrameResult<Table>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut picked: Vec<(usize, String)> = Vec::with_capacity(columns.len());
        for (source, label) in columns {
            let source = source.as_ref();
            let idx = self
                .position(source)
                .ok_or_else(|| FrameError::unknown_column(source))?;
            picked.push((idx, label.as_ref().to_string()));
        }

        let mut groups = Vec::with_capacity(self.groups().len());
        let mut missing: Vec<(usize, String)> = Vec::new();
        for key in self.groups() {
            let idx = self
                .position(key)
                .ok_or_else(|| FrameError::unknown_column(key.as_str()))?;
            match picked.iter().find(|(i, _)| *i == idx) {
                Some((_, label)) => groups.push(label.clone()),
                None => {
                    missing.push((idx, key.clone()));
                    groups.push(key.clone());
                }
            }
        }
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|(_, name)| name.as_str()).collect();
            info!("select: adding missing grouping columns: {}", names.join(", "));
            missing.extend(picked);
            picked = missing;
        }

        self.project(picked, groups)
    }

    /// Rename `(old, new)` pairs. Every column shares storage with `self`.
    ///
    /// Old names refer to the input table, so swapping two names in one call works.
    pub fn rename<S, T>(&self, renames: &[(S, T)]) -> FrameResult<Table>
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut names = self.names().to_vec();
        for (old, new) in renames {
            let old = old.as_ref();
            let idx = self
                .position(old)
                .ok_or_else(|| FrameError::unknown_column(old))?;
            names[idx] = new.as_ref().to_string();
        }
        let picked: Vec<(usize, String)> = names.into_iter().enumerate().collect();
        let groups = self
            .groups()
            .iter()
            .filter_map(|key| self.position(key))
            .map(|idx| picked[idx].1.clone())
            .collect();
        self.project(picked, groups)
    }

    /// Move `column` in front of `before`, or to the front when `before` is `None`.
    pub fn relocate(&self, column: &str, before: Option<&str>) -> FrameResult<Table> {
        let idx = self
            .position(column)
            .ok_or_else(|| FrameError::unknown_column(column))?;
        let mut order: Vec<usize> = (0..self.column_count()).filter(|&i| i != idx).collect();
        let at = match before {
            None => 0,
            Some(anchor) => {
                let anchor_idx = self
                    .position(anchor)
                    .ok_or_else(|| FrameError::unknown_column(anchor))?;
                order
                    .iter()
                    .position(|&i| i == anchor_idx)
                    .unwrap_or(idx)
            }
        };
        order.insert(at, idx);

        let picked = order
            .into_iter()
            .map(|i| (i, self.names()[i].clone()))
            .collect();
        self.project(picked, self.groups().to_vec())
    }

    /// The column handle itself; shares storage with the table.
    pub fn pull(&self, name: &str) -> FrameResult<Column> {
        self.column(name).cloned()
    }

    /// Set an extra attribute. Every column shares storage with `self`.
    pub fn with_attribute(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> FrameResult<Table> {
        let (key, value) = (key.into(), value.into());
        let attrs = self.attributes().derive(|set| {
            set.set_extra(key, value);
            Ok(())
        })?;
        Table::assemble(self.columns().to_vec(), attrs, self.row_count())
    }

    fn project(&self, picked: Vec<(usize, String)>, groups: Vec<String>) -> FrameResult<Table> {
        let columns: Vec<Column> = picked
            .iter()
            .map(|(idx, _)| self.columns()[*idx].clone())
            .collect();
        let names: Vec<String> = picked.into_iter().map(|(_, label)| label).collect();
        let attrs = self.attributes().derive(|set| {
            set.set_names(names)?;
            set.set_groups(groups);
            Ok(())
        })?;
        let out = Table::assemble(columns, attrs, self.row_count())?;
        debug!(
            "project: {} of {} columns kept, all shared",
            out.column_count(),
            self.column_count()
        );
        Ok(out)
    }
}
