use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTopic {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub topics: Vec<CategoryTopic>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub groups: Vec<CategoryGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryList {
    pub categories: Vec<Category>,
}

impl CategoryList {
    /// Looks a topic up across every category and group.
    #[must_use]
    pub fn find_topic(&self, topic_id: i64) -> Option<&CategoryTopic> {
        self.categories
            .iter()
            .flat_map(|category| category.groups.iter())
            .flat_map(|group| group.topics.iter())
            .find(|topic| topic.id == topic_id)
    }
}
