//! GraphQL documents sent to the Hardcover API
//!
//! Each document declares the variables it accepts so that a binding can be
//! checked before it leaves the process.

use serde_json::{Map, Value};

/// A named, parameterized GraphQL operation
#[derive(Debug, PartialEq, Eq)]
pub struct QueryDocument {
    /// The operation name, sent as `operationName`
    pub operation_name: &'static str,

    /// The GraphQL source text
    pub document: &'static str,

    /// Variables that must be bound
    pub required_variables: &'static [&'static str],

    /// Variables that may be bound
    pub optional_variables: &'static [&'static str],
}

/// A variable binding that does not fit a document
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum BindingError {
    #[error("operation {operation} does not declare variable ${variable}")]
    Undeclared {
        operation: &'static str,
        variable: String,
    },

    #[error("operation {operation} requires variable ${variable}")]
    MissingRequired {
        operation: &'static str,
        variable: &'static str,
    },
}

impl QueryDocument {
    fn declares(&self, variable: &str) -> bool {
        self.required_variables
            .iter()
            .chain(self.optional_variables)
            .any(|declared| *declared == variable)
    }

    /// Check that `variables` binds every required variable and nothing undeclared
    pub fn check_variables(&self, variables: &Map<String, Value>) -> Result<(), BindingError> {
        if let Some(variable) = variables.keys().find(|name| !self.declares(name)) {
            return Err(BindingError::Undeclared {
                operation: self.operation_name,
                variable: variable.clone(),
            });
        }
        if let Some(variable) = self
            .required_variables
            .iter()
            .find(|name| variables.get(**name).is_none_or(Value::is_null))
        {
            return Err(BindingError::MissingRequired {
                operation: self.operation_name,
                variable: *variable,
            });
        }
        Ok(())
    }
}

/// Books whose title or author matches `$query`, most read first
pub const SEARCH_BOOKS: QueryDocument = QueryDocument {
    operation_name: "SearchBooks",
    document: r#"query SearchBooks($query: String!, $limit: Int = 10) {
  books(
    where: {
      _or: [
        { title: { _ilike: $query } }
        { author_users: { user: { name: { _ilike: $query } } } }
      ]
    }
    limit: $limit
    order_by: { users_read_count: desc }
  ) {
    id
    title
    description
    release_date
    rating
    users_read_count
    cached_tags
    images {
      url
      width
      height
    }
    author_users {
      user {
        id
        name
      }
    }
    series_books {
      series {
        id
        name
      }
      position
    }
  }
}"#,
    required_variables: &["query"],
    optional_variables: &["limit"],
};

/// A single book with its authors, series and latest reviews
pub const GET_BOOK_DETAILS: QueryDocument = QueryDocument {
    operation_name: "GetBook",
    document: r#"query GetBook($id: Int!) {
  books_by_pk(id: $id) {
    id
    title
    description
    release_date
    rating
    users_read_count
    pages
    language
    isbn_10
    isbn_13
    cached_tags
    images {
      url
      width
      height
    }
    author_users {
      user {
        id
        name
        bio
      }
    }
    series_books {
      series {
        id
        name
        description
      }
      position
    }
    reviews(limit: 5, order_by: { created_at: desc }) {
      id
      body
      rating
      user {
        name
      }
      created_at
    }
  }
}"#,
    required_variables: &["id"],
    optional_variables: &[],
};

/// Library entries of an explicit user, most recently updated first
pub const GET_USER_LIBRARY: QueryDocument = QueryDocument {
    operation_name: "GetUserLibrary",
    document: r#"query GetUserLibrary($userId: Int!) {
  user_books(
    where: { user_id: { _eq: $userId } }
    order_by: { updated_at: desc }
  ) {
    ...LibraryEntry
  }
}

fragment LibraryEntry on user_books {
  id
  status
  rating
  progress
  created_at
  updated_at
  book {
    id
    title
    description
    release_date
    rating
    pages
    images {
      url
    }
    author_users {
      user {
        name
      }
    }
  }
}"#,
    required_variables: &["userId"],
    optional_variables: &[],
};

/// Library entries of the user that owns the API key
pub const GET_MY_LIBRARY: QueryDocument = QueryDocument {
    operation_name: "GetMyLibrary",
    document: r#"query GetMyLibrary {
  me {
    user_books(order_by: { updated_at: desc }) {
      ...LibraryEntry
    }
  }
}

fragment LibraryEntry on user_books {
  id
  status
  rating
  progress
  created_at
  updated_at
  book {
    id
    title
    description
    release_date
    rating
    pages
    images {
      url
    }
    author_users {
      user {
        name
      }
    }
  }
}"#,
    required_variables: &[],
    optional_variables: &[],
};

pub const ADD_BOOK_TO_LIBRARY: QueryDocument = QueryDocument {
    operation_name: "AddBookToLibrary",
    document: r#"mutation AddBookToLibrary($bookId: Int!, $status: String!) {
  insert_user_books_one(object: { book_id: $bookId, status: $status }) {
    id
    status
    book {
      id
      title
    }
  }
}"#,
    required_variables: &["bookId", "status"],
    optional_variables: &[],
};

pub const UPDATE_READING_STATUS: QueryDocument = QueryDocument {
    operation_name: "UpdateReadingStatus",
    document: r#"mutation UpdateReadingStatus($id: Int!, $status: String!, $rating: Int, $progress: Int) {
  update_user_books_by_pk(
    pk_columns: { id: $id }
    _set: { status: $status, rating: $rating, progress: $progress }
  ) {
    id
    status
    rating
    progress
  }
}"#,
    required_variables: &["id", "status"],
    optional_variables: &["rating", "progress"],
};
