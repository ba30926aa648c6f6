mod repo_detail;
mod repo_list;

pub use repo_detail::draw_repo_detail;
pub use repo_list::{draw_repo_list, RepoListProps};
