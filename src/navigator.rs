//! 画面スタック
//!
//! 各エントリは画面IDと文字列パラメータのみを持つ。型付きルートへの復元は
//! 画面の入口（`Route::decode`）で行う。

use crew_photo_common::{Navigation, ParamBag, Route, Screen};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub screen: Screen,
    pub params: ParamBag,
}

impl Entry {
    fn from_route(route: &Route) -> Self {
        Self {
            screen: route.screen(),
            params: route.to_params(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    stack: Vec<Entry>,
}

impl Navigator {
    pub fn new(initial: &Route) -> Self {
        Self {
            stack: vec![Entry::from_route(initial)],
        }
    }

    pub fn current(&self) -> Option<&Entry> {
        self.stack.last()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// 下から順の画面一覧
    pub fn screens(&self) -> Vec<Screen> {
        self.stack.iter().map(|e| e.screen).collect()
    }

    pub fn push(&mut self, route: &Route) {
        self.stack.push(Entry::from_route(route));
    }

    /// 生のパラメータで積む（外部からの遷移要求）
    pub fn push_raw(&mut self, screen: Screen, params: ParamBag) {
        self.stack.push(Entry { screen, params });
    }

    pub fn replace(&mut self, route: &Route) {
        self.stack.pop();
        self.push(route);
    }

    /// 一つ戻る。スタックが空になったらfalse
    pub fn back(&mut self) -> bool {
        self.stack.pop();
        !self.stack.is_empty()
    }

    /// `route` の画面まで戻る。スタックに無ければ `route` だけのスタックにする
    pub fn pop_to(&mut self, route: &Route) {
        let screen = route.screen();
        match self.stack.iter().rposition(|e| e.screen == screen) {
            Some(index) => self.stack.truncate(index + 1),
            None => self.reset(route),
        }
    }

    pub fn reset(&mut self, route: &Route) {
        self.stack.clear();
        self.push(route);
    }

    pub fn navigate(&mut self, navigation: Navigation) {
        match &navigation {
            Navigation::Stay => return,
            Navigation::Push(route) => self.push(route),
            Navigation::Replace(route) => self.replace(route),
            Navigation::Back => {
                self.back();
            }
            Navigation::PopTo(route) => self.pop_to(route),
            Navigation::Reset(route) => self.reset(route),
        }
        debug!(stack = ?self.screens(), "navigated");
    }
}
